#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use linkr::link::{LinkEntry, NewLink};
use linkr::store::{DirectoryStore, StoreError};
use linkr::suggest::{Suggestion, SuggestionProvider};
use llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    error::LLMError,
};

pub fn entry(id: &str, name: &str, url: &str) -> LinkEntry {
    LinkEntry {
        id: Some(id.to_owned()),
        name: name.to_owned(),
        url: url.to_owned(),
        aliases: Vec::new(),
        created_at: Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("Expected a valid date."),
    }
}

pub fn link(name: &str, url: &str) -> NewLink {
    NewLink::new(name, url).expect("Expected a valid link.")
}

/// In-memory store counting single-item writes, with writes for chosen
/// names failing until healed.
pub struct CountingStore {
    entries: Mutex<Vec<LinkEntry>>,
    failing: Mutex<HashSet<String>>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    next_id: AtomicUsize,
}

impl CountingStore {
    pub fn new(entries: Vec<LinkEntry>) -> Self {
        CountingStore {
            next_id: AtomicUsize::new(entries.len() + 1),
            entries: Mutex::new(entries),
            failing: Mutex::new(HashSet::new()),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(self, names: &[&str]) -> Self {
        self.failing
            .lock()
            .expect("Store mutex poisoned")
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    pub fn heal(&self) {
        self.failing.lock().expect("Store mutex poisoned").clear();
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<LinkEntry> {
        self.entries.lock().expect("Store mutex poisoned").clone()
    }

    fn check(&self, name: &str) -> Result<(), StoreError> {
        if self.failing.lock().expect("Store mutex poisoned").contains(name) {
            return Err(StoreError::Transport(format!("refused {name}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for CountingStore {
    async fn list(&self) -> Result<Vec<LinkEntry>, StoreError> {
        Ok(self.snapshot())
    }

    async fn create(&self, link: NewLink) -> Result<LinkEntry, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check(link.name())?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = LinkEntry {
            id: Some(id.to_string()),
            ..LinkEntry::unsaved(link)
        };
        self.entries.lock().expect("Store mutex poisoned").push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, link: NewLink) -> Result<LinkEntry, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check(link.name())?;
        let mut entries = self.entries.lock().expect("Store mutex poisoned");
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        entry.name = link.name().to_owned();
        entry.url = link.url().to_owned();
        Ok(entry.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .expect("Store mutex poisoned")
            .retain(|entry| entry.id.as_deref() != Some(id));
        Ok(())
    }
}

/// Returns the same suggestions for every query.
pub struct StubSuggestions(pub Vec<Suggestion>);

#[async_trait]
impl SuggestionProvider for StubSuggestions {
    async fn suggest(&self, _query: &str) -> Vec<Suggestion> {
        self.0.clone()
    }
}

pub fn suggestion(title: &str, url: &str) -> Suggestion {
    Suggestion {
        title: title.to_owned(),
        url: url.to_owned(),
    }
}

/// Answers every chat request with the next canned response, repeating the
/// last one when they run out.
pub(crate) struct StubLlmProvider {
    responses: Vec<String>,
    calls: AtomicUsize,
}

impl StubLlmProvider {
    pub fn new(responses: &[&str]) -> Self {
        StubLlmProvider {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChatProvider for StubLlmProvider {
    fn chat<'life0, 'life1, 'async_trait>(
        &'life0 self,
        _messages: &'life1 [ChatMessage],
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let content = self
            .responses
            .get(call)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or_default();

        Box::pin(async move {
            #[derive(Debug)]
            struct StringResponse(String);

            impl ChatResponse for StringResponse {
                fn text(&self) -> Option<String> {
                    Some(self.0.clone())
                }

                fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
                    panic!()
                }

                fn thinking(&self) -> Option<String> {
                    None
                }

                fn usage(&self) -> Option<llm::chat::Usage> {
                    None
                }
            }

            impl std::fmt::Display for StringResponse {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(formatter, "{}", self.0)
                }
            }

            Ok(Box::new(StringResponse(content)) as Box<dyn ChatResponse>)
        })
    }

    fn chat_with_tools<'life0, 'life1, 'life2, 'async_trait>(
        &'life0 self,
        _messages: &'life1 [ChatMessage],
        _tools: Option<&'life2 [Tool]>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        Self: 'async_trait,
    {
        panic!()
    }
}
