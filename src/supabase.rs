use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

const REST_PATH: &str = "rest/v1";
const AUTH_PATH: &str = "auth/v1";

/// PostgREST single-object response format.
const ACCEPT_SINGLE: &str = "application/vnd.pgrst.object+json";

#[derive(Debug, serde::Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RefCell<Option<Session>>,
}

/// Handle to the hosted backend. Cheap to clone; all clones share the
/// signed-in session.
#[derive(Clone)]
pub struct Supabase(Rc<Inner>);

impl PartialEq for Supabase {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Supabase {
    /// Reads the service endpoint and public access key baked in at build
    /// time. Both are required; a missing value is a startup error.
    pub fn from_env() -> Result<Self> {
        match (option_env!("SUPABASE_URL"), option_env!("SUPABASE_ANON_KEY")) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Ok(Self::new(url, key))
            }
            _ => Err(anyhow!(
                "SUPABASE_URL and SUPABASE_ANON_KEY must be set in the build environment"
            )),
        }
    }

    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self(Rc::new(Inner {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            anon_key: anon_key.to_owned(),
            session: RefCell::new(None),
        }))
    }

    /// Starts a read query against a table.
    pub fn from(&self, table: &str) -> Query {
        Query {
            client: self.clone(),
            table: table.to_owned(),
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let url = format!("{}/{AUTH_PATH}/token", self.0.base_url);
        let session = self
            .0
            .http
            .post(url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.0.anon_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?
            .error_for_status()?
            .json::<Session>()
            .await?;
        self.0.session.replace(Some(session));
        Ok(())
    }

    /// Revokes the current session. A no-op when nobody is signed in; the
    /// local session is dropped even if the revocation request fails.
    pub async fn sign_out(&self) -> Result<()> {
        let session = match self.0.session.take() {
            Some(session) => session,
            None => return Ok(()),
        };
        let url = format!("{}/{AUTH_PATH}/logout", self.0.base_url);
        self.0
            .http
            .post(url)
            .header("apikey", &self.0.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub fn signed_in(&self) -> bool {
        self.0.session.borrow().is_some()
    }

    /// Bearer value for data requests: the session token once signed in,
    /// the public key before.
    fn bearer(&self) -> String {
        let session = self.0.session.borrow();
        let token = session
            .as_ref()
            .map_or(self.0.anon_key.as_str(), |s| s.access_token.as_str());
        format!("Bearer {token}")
    }
}

/// Row-set read query: equality filters, one ordering and a row limit.
pub struct Query {
    client: Supabase,
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<usize>,
}

impl Query {
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.split_whitespace().collect::<Vec<_>>().join(""));
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_owned(), format!("eq.{value}")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{column}.{direction}"));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        Ok(self
            .request()
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    /// Single-row variant; errors when the filter does not match exactly
    /// one row.
    pub async fn single<T: DeserializeOwned>(self) -> Result<T> {
        Ok(self
            .request()
            .header(ACCEPT, ACCEPT_SINGLE)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    fn request(&self) -> reqwest::RequestBuilder {
        let url = format!("{}/{REST_PATH}/{}", self.client.0.base_url, self.table);
        self.client
            .0
            .http
            .get(url)
            .query(&self.params())
            .header("apikey", &self.client.0.anon_key)
            .header(AUTHORIZATION, self.client.bearer())
    }

    fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = &self.select {
            params.push(("select".to_owned(), select.clone()));
        }
        for (column, filter) in &self.filters {
            params.push((column.clone(), filter.clone()));
        }
        if let Some(order) = &self.order {
            params.push(("order".to_owned(), order.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Supabase {
        Supabase::new("http://localhost:54321/", "anon-key")
    }

    #[test]
    fn params_carry_select_filter_order_and_limit() {
        let query = client()
            .from("Niveis")
            .select("nivel_agua, nivel_oleo, data")
            .eq("fk_tanque", 3)
            .order("data", false)
            .limit(390);

        assert_eq!(
            query.params(),
            vec![
                ("select".to_owned(), "nivel_agua,nivel_oleo,data".to_owned()),
                ("fk_tanque".to_owned(), "eq.3".to_owned()),
                ("order".to_owned(), "data.desc".to_owned()),
                ("limit".to_owned(), "390".to_owned()),
            ]
        );
    }

    #[test]
    fn ascending_order_and_no_limit() {
        let query = client()
            .from("Tanque")
            .select("pk_tanque, nome_tanque")
            .order("nome_tanque", true);

        assert_eq!(
            query.params(),
            vec![
                ("select".to_owned(), "pk_tanque,nome_tanque".to_owned()),
                ("order".to_owned(), "nome_tanque.asc".to_owned()),
            ]
        );
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let query = client().from("Tanque");
        assert_eq!(query.client.0.base_url, "http://localhost:54321");
    }

    #[test]
    fn fresh_client_is_signed_out() {
        assert!(!client().signed_in());
    }
}
