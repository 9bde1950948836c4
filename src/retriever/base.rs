//! The memoizing core every retriever wraps.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::clients::{GraphqlErrorEntry, QueryClient};
use crate::error::RetrieverError;

/// The outcome of the one query a retriever executes.
#[derive(Debug)]
struct Fetched<T> {
    query: String,
    result: T,
    errors: Vec<GraphqlErrorEntry>,
}

/// `Unfetched` until the first fetch accessor runs, `Fetched` forever after.
#[derive(Debug)]
enum FetchState<T> {
    Unfetched,
    Fetched(Fetched<T>),
}

/// Owns the client, an optional query override and the fetch state.
///
/// `fetch_with` executes the query at most once. Every later call returns the
/// memoized result, whether the first call produced entities, nothing at all,
/// or only errors.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use commerce_graphql::{CommerceConfig, EndpointUrl, GraphqlClient, QueryClient, Retriever};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CommerceConfig::builder()
///     .endpoint(EndpointUrl::new("https://shop.example.com/graphql")?)
///     .build()?;
/// let client: Arc<dyn QueryClient> = Arc::new(GraphqlClient::new(&config));
///
/// let mut retriever: Retriever<Option<serde_json::Value>> = Retriever::new(Some(client))?;
/// let data = retriever
///     .fetch_with(|| Ok("{storeConfig{store_code}}".to_string()), Ok)
///     .await?;
/// println!("{data:?}");
/// # Ok(())
/// # }
/// ```
pub struct Retriever<T> {
    client: Arc<dyn QueryClient>,
    query: Option<String>,
    state: FetchState<T>,
}

impl<T> Retriever<T> {
    /// Creates an unfetched retriever.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MissingClient`] if `client` is `None`.
    pub fn new(client: Option<Arc<dyn QueryClient>>) -> Result<Self, RetrieverError> {
        let client = client.ok_or(RetrieverError::MissingClient)?;
        Ok(Self {
            client,
            query: None,
            state: FetchState::Unfetched,
        })
    }

    /// Replaces the generated query with `query`.
    ///
    /// Has no effect once the retriever has fetched.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = Some(query.into());
    }

    /// Returns the query override, if one is set.
    #[must_use]
    pub fn query_override(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the query that was executed, once fetched.
    #[must_use]
    pub fn executed_query(&self) -> Option<&str> {
        match &self.state {
            FetchState::Fetched(fetched) => Some(&fetched.query),
            FetchState::Unfetched => None,
        }
    }

    /// Returns `true` once the query has been executed.
    #[must_use]
    pub const fn is_fetched(&self) -> bool {
        matches!(self.state, FetchState::Fetched(_))
    }

    /// Returns the errors of the executed query.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::NotFetched`] before the first fetch.
    pub fn errors(&self) -> Result<&[GraphqlErrorEntry], RetrieverError> {
        match &self.state {
            FetchState::Fetched(fetched) => Ok(&fetched.errors),
            FetchState::Unfetched => Err(RetrieverError::NotFetched),
        }
    }

    /// Returns `true` if the executed query returned errors.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::NotFetched`] before the first fetch.
    pub fn has_errors(&self) -> Result<bool, RetrieverError> {
        self.errors().map(|errors| !errors.is_empty())
    }

    /// Returns the memoized result without fetching.
    #[must_use]
    pub fn result(&self) -> Option<&T> {
        match &self.state {
            FetchState::Fetched(fetched) => Some(&fetched.result),
            FetchState::Unfetched => None,
        }
    }
}

impl<T: Default> Retriever<T> {
    /// Fetches once and returns the memoized result.
    ///
    /// On the first call, `generate` builds the query (skipped when an
    /// override is set), the client executes it and `parse` maps the `data`
    /// member. A response with errors leaves the result at `T::default()`; data
    /// that cannot be parsed is recorded as an error entry. Later calls return
    /// the stored result and invoke neither closure.
    ///
    /// # Errors
    ///
    /// Propagates errors returned by `generate`. The retriever stays unfetched
    /// in that case.
    pub async fn fetch_with<G, P>(&mut self, generate: G, parse: P) -> Result<&T, RetrieverError>
    where
        G: FnOnce() -> Result<String, RetrieverError>,
        P: FnOnce(Option<Value>) -> Result<T, serde_json::Error>,
    {
        if let FetchState::Unfetched = self.state {
            let query = match &self.query {
                Some(query) => query.clone(),
                None => generate()?,
            };
            tracing::debug!("Executing GraphQL query: {}", query);

            let response = self.client.execute(&query).await;
            let mut errors = response.errors;
            let result = if errors.is_empty() {
                match parse(response.data) {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!("Unable to map GraphQL response data: {}", e);
                        errors.push(GraphqlErrorEntry::new(format!(
                            "Unable to map response data: {e}"
                        )));
                        T::default()
                    }
                }
            } else {
                tracing::warn!("GraphQL query returned {} error(s)", errors.len());
                T::default()
            };

            self.state = FetchState::Fetched(Fetched {
                query,
                result,
                errors,
            });
        }

        match &self.state {
            FetchState::Fetched(fetched) => Ok(&fetched.result),
            FetchState::Unfetched => Err(RetrieverError::NotFetched),
        }
    }
}

impl<T> fmt::Debug for Retriever<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retriever")
            .field("query", &self.query)
            .field("fetched", &self.is_fetched())
            .finish_non_exhaustive()
    }
}

/// Deserializes `data[key]`, treating a missing `data` or `null` member as
/// `T::default()`.
pub(crate) fn parse_member<T>(data: Option<Value>, key: &str) -> Result<T, serde_json::Error>
where
    T: serde::de::DeserializeOwned + Default,
{
    match data.and_then(|mut data| data.get_mut(key).map(Value::take)) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value),
    }
}
