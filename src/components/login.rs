use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::supabase::Supabase;
use crate::Route;

#[function_component(Login)]
pub fn login() -> Html {
    let supabase = use_context::<Supabase>().expect("no backend client in context");
    let navigator = use_navigator().expect("no router in scope");

    let email = use_state(String::new);
    let password = use_state(String::new);
    let error = use_state(|| None::<&'static str>);
    let busy = use_state(|| false);

    let oninput_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) {
                email.set(input.value());
            }
        })
    };

    let oninput_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) {
                password.set(input.value());
            }
        })
    };

    let onsubmit = {
        let supabase = supabase.clone();
        let navigator = navigator.clone();
        let email = email.clone();
        let password = password.clone();
        let error = error.clone();
        let busy = busy.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            busy.set(true);
            error.set(None);

            let supabase = supabase.clone();
            let navigator = navigator.clone();
            let email = (*email).clone();
            let password = (*password).clone();
            let error = error.clone();
            let busy = busy.clone();
            spawn_local(async move {
                match supabase.sign_in(&email, &password).await {
                    Ok(()) => navigator.push(&Route::Home),
                    Err(err) => {
                        // details stay in the console, the user gets a
                        // generic message
                        log::error!("sign-in failed: {err}");
                        busy.set(false);
                        error.set(Some("Invalid email or password."));
                    }
                }
            });
        })
    };

    html! {
        <div class="login-container">
            <div class="text-side">
                <h1 class="title">{ "Optical Profiler" }</h1>
            </div>

            <div class="login-form-container">
                <form {onsubmit}>
                    <h1>{ "Sign in" }</h1>

                    if let Some(message) = *error {
                        <p class="login-error">{ message }</p>
                    }

                    <div class="input-field">
                        <input
                            type="email"
                            placeholder="Email"
                            value={(*email).clone()}
                            oninput={oninput_email}
                            required={true}
                        />
                    </div>

                    <div class="input-field">
                        <input
                            type="password"
                            placeholder="Password"
                            value={(*password).clone()}
                            oninput={oninput_password}
                            required={true}
                        />
                    </div>

                    <button type="submit" disabled={*busy}>
                        { if *busy { "Signing in..." } else { "Sign in" } }
                    </button>
                </form>
            </div>
        </div>
    }
}
