mod components;
mod db;
mod levels;
mod request;
mod sensors;
mod supabase;
mod utils;

use yew::prelude::*;
use yew_router::prelude::*;

use crate::supabase::Supabase;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Login,
    #[at("/home")]
    Home,
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub supabase: Supabase,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    html! {
        <ContextProvider<Supabase> context={props.supabase.clone()}>
            <BrowserRouter>
                <Switch<Route> render={switch} />
            </BrowserRouter>
        </ContextProvider<Supabase>>
    }
}

fn switch(route: Route) -> Html {
    match route {
        Route::Login => html! { <components::login::Login /> },
        Route::Home => html! { <components::home::Home /> },
        Route::NotFound => html! { <h1>{ "404" }</h1> },
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());

    let supabase = match Supabase::from_env() {
        Ok(client) => client,
        Err(err) => panic!("startup configuration: {err}"),
    };

    yew::Renderer::<App>::with_props(AppProps { supabase }).render();
}
