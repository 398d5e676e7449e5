//! Priority-ordered provider fallback dispatch.
//!
//! A chain is configured once with a fixed order of (model, client)
//! links. Each generation call walks the chain: one attempt per link,
//! first success wins, every attempt logged. The chain never reorders
//! itself and never retries a link.

use std::sync::Arc;

use tracing::{info, warn};

use vforge_models::TextModel;

use crate::error::{ProviderError, ProviderResult};
use crate::text::{TextGenerator, TextRequest};

/// One link in a fallback chain: a client plus the model it should use.
#[derive(Clone)]
pub struct ChainLink {
    pub model: TextModel,
    pub generator: Arc<dyn TextGenerator>,
}

/// Statically ordered list of providers tried in sequence until one
/// succeeds or all fail.
#[derive(Clone)]
pub struct FallbackChain {
    links: Vec<ChainLink>,
}

impl FallbackChain {
    /// Build a chain from priority-ordered links.
    pub fn new(links: Vec<ChainLink>) -> Self {
        Self { links }
    }

    /// Build a chain routing each model to the matching client.
    pub fn from_priority(
        priority: &[TextModel],
        route: impl Fn(TextModel) -> Arc<dyn TextGenerator>,
    ) -> Self {
        let links = priority
            .iter()
            .map(|&model| ChainLink {
                model,
                generator: route(model),
            })
            .collect();
        Self { links }
    }

    /// Number of links in the chain.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Walk the chain until a provider succeeds.
    ///
    /// The request's model field is retargeted per link; all other call
    /// parameters pass through unchanged, so a caller cannot distinguish
    /// a fallback success from the first provider succeeding directly.
    pub async fn generate(&self, request: &TextRequest) -> ProviderResult<String> {
        let mut last_error: Option<ProviderError> = None;

        for (attempt, link) in self.links.iter().enumerate() {
            let attempt_request = request.for_model(link.model);
            info!(
                provider = %link.generator.name(),
                model = %link.model,
                attempt = attempt + 1,
                fallback = attempt > 0,
                "Attempting text generation"
            );

            match link.generator.generate(&attempt_request).await {
                Ok(text) => {
                    info!(
                        provider = %link.generator.name(),
                        model = %link.model,
                        fallback = attempt > 0,
                        "Text generation succeeded"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        provider = %link.generator.name(),
                        model = %link.model,
                        error = %e,
                        "Text generation attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(ProviderError::AllProvidersExhausted {
            attempts: self.links.len(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "fallback chain is empty".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted provider that records call order and fails or succeeds
    /// per its configuration.
    struct ScriptedProvider {
        label: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl TextGenerator for ScriptedProvider {
        fn name(&self) -> String {
            self.label.to_string()
        }

        async fn generate(&self, _request: &TextRequest) -> ProviderResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(self.label);
            if self.succeed {
                Ok(format!("output from {}", self.label))
            } else {
                Err(ProviderError::request_failed(format!("{} is down", self.label)))
            }
        }
    }

    fn link(
        label: &'static str,
        succeed: bool,
        order: &Arc<Mutex<Vec<&'static str>>>,
    ) -> (ChainLink, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let link = ChainLink {
            model: TextModel::GeminiFlash,
            generator: Arc::new(ScriptedProvider {
                label,
                succeed,
                calls: Arc::clone(&calls),
                order: Arc::clone(order),
            }),
        };
        (link, calls)
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (a, a_calls) = link("a", true, &order);
        let (b, b_calls) = link("b", true, &order);
        let chain = FallbackChain::new(vec![a, b]);

        let request = TextRequest::new("prompt", TextModel::GeminiFlash);
        let result = chain.generate(&request).await.unwrap();

        assert_eq!(result, "output from a");
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_in_order_until_success() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (a, _) = link("a", false, &order);
        let (b, _) = link("b", false, &order);
        let (c, _) = link("c", true, &order);
        let chain = FallbackChain::new(vec![a, b, c]);

        let request = TextRequest::new("prompt", TextModel::GeminiFlash);
        let result = chain.generate(&request).await.unwrap();

        // C's result comes back through the same output contract
        assert_eq!(result, "output from c");
        // Exactly three attempts in order a, b, c
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_all_fail_raises_exhausted() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (a, a_calls) = link("a", false, &order);
        let (b, b_calls) = link("b", false, &order);
        let chain = FallbackChain::new(vec![a, b]);

        let request = TextRequest::new("prompt", TextModel::GeminiFlash);
        let err = chain.generate(&request).await.unwrap_err();

        assert!(err.is_exhausted());
        // One attempt per provider, no internal retry
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        match err {
            ProviderError::AllProvidersExhausted { attempts, last_error } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("b is down"));
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_exhausted() {
        let chain = FallbackChain::new(Vec::new());
        let request = TextRequest::new("prompt", TextModel::GeminiFlash);
        assert!(chain.generate(&request).await.unwrap_err().is_exhausted());
    }
}
