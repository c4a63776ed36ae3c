//! Lazy iteration over paged collections.
//!
//! A paged endpoint is called repeatedly with `paging-offset` and
//! `paging-limit` query parameters. Each page must decode to a sequence; its
//! items are handed out one by one in server order and the next page is only
//! requested once the buffer is empty.
//!
//! The iteration ends when:
//! - a page holds fewer items than the limit,
//! - `paging-total-items` says every item has been seen,
//! - the server sent `paging-next` on an earlier page and omits it (or sends
//!   it empty) now,
//! - the server answers `NothingToReturnError`.

use std::collections::VecDeque;
use std::marker::PhantomData;

use courier_core::{ApiErrorKind, Endpoint, Error, Outcome, RequestContext, Result, Transport, Value, wire};
use futures_core::Stream;
use serde::de::DeserializeOwned;

use crate::Client;

/// State of a [`Pages`] iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Ready to hand out buffered items or fetch the next page.
    Ready,
    /// A page request is in flight.
    Fetching,
    /// Every item has been handed out.
    Exhausted,
    /// A page request or an item failed; no more items.
    Failed,
}

/// Items of a paged endpoint, fetched page by page.
///
/// ```no_run
/// # async fn run(client: courier::Client) -> courier::Result<()> {
/// use courier::prelude::*;
///
/// let endpoint = Endpoint::get("/names").paged(25).build()?;
/// let mut names = client.paged::<String>(&endpoint, RequestContext::new());
/// while let Some(name) = names.next().await {
///     println!("{}", name?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Pages<T, R = Value> {
    client: Client<T>,
    endpoint: Endpoint,
    ctx: RequestContext,
    offset: u64,
    limit: Option<u64>,
    buffer: VecDeque<Value>,
    state: PageState,
    saw_next: bool,
    pages_fetched: usize,
    item: PhantomData<fn() -> R>,
}

impl<T, R> std::fmt::Debug for Pages<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pages")
            .field("endpoint", &self.endpoint)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("buffered", &self.buffer.len())
            .field("state", &self.state)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}

impl<T: Transport, R: DeserializeOwned> Pages<T, R> {
    pub(crate) fn new(client: Client<T>, endpoint: Endpoint, ctx: RequestContext) -> Self {
        let paging = endpoint.paging();
        let offset = ctx
            .paging_offset()
            .or(paging.map(|paging| paging.offset))
            .unwrap_or_default();
        let limit = ctx
            .paging_limit()
            .or(paging.map(|paging| paging.limit))
            .filter(|limit| *limit > 0);

        Self {
            client,
            endpoint,
            ctx,
            offset,
            limit,
            buffer: VecDeque::new(),
            state: PageState::Ready,
            saw_next: false,
            pages_fetched: 0,
            item: PhantomData,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PageState {
        self.state
    }

    /// Number of page requests sent so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Offset of the next page to fetch.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Pull the next item, fetching a page when the buffer is empty.
    ///
    /// Returns `None` once the collection is exhausted. A failure is
    /// returned once, after which the iterator yields nothing.
    pub async fn next(&mut self) -> Option<Result<R>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return match courier_core::from_value(item) {
                    Ok(item) => Some(Ok(item)),
                    Err(err) => {
                        self.buffer.clear();
                        self.state = PageState::Failed;
                        Some(Err(Error::ResponseValidation(err)))
                    }
                };
            }
            // A fetch interrupted by a dropped future is simply retried.
            if matches!(self.state, PageState::Exhausted | PageState::Failed) {
                return None;
            }

            if let Err(err) = self.fetch_page().await {
                return Some(Err(err));
            }
        }
    }

    /// Turn the iterator into a [`Stream`] of items.
    pub fn into_stream(self) -> impl Stream<Item = Result<R>> {
        futures_util::stream::unfold(self, |mut pages| async move {
            let item = pages.next().await?;
            Some((item, pages))
        })
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let Some(limit) = self.limit else {
            self.state = PageState::Failed;
            return Err(Error::configuration(format!(
                "endpoint '{}' has no page size",
                self.endpoint.path()
            )));
        };

        self.state = PageState::Fetching;
        let mut ctx = self.ctx.clone();
        ctx.set_paging(self.offset, limit);
        self.pages_fetched += 1;

        tracing::debug!(
            offset = self.offset,
            limit,
            page = self.pages_fetched,
            "fetching page"
        );

        let outcome = match self.client.execute(&self.endpoint, ctx).await {
            Ok(outcome) => outcome,
            Err(Error::Api(api)) if api.is(&ApiErrorKind::NOTHING_TO_RETURN) => {
                tracing::debug!(offset = self.offset, "server has nothing more to return");
                self.state = PageState::Exhausted;
                return Ok(());
            }
            Err(err) => {
                self.state = PageState::Failed;
                return Err(err);
            }
        };

        // `Some(true)` when the next-page header is present but empty.
        let next_empty = outcome
            .header(wire::PAGING_NEXT)
            .map(|next| next.trim().is_empty());
        let total = outcome
            .header(wire::PAGING_TOTAL_ITEMS)
            .and_then(|raw| raw.trim().parse::<u64>().ok());

        let items = match page_items(outcome) {
            Ok(items) => items,
            Err(err) => {
                self.state = PageState::Failed;
                return Err(err);
            }
        };
        let count = u64::try_from(items.len()).unwrap_or(u64::MAX);
        self.buffer.extend(items);
        let seen = self.offset.saturating_add(count);

        let exhausted = count < limit
            || total.is_some_and(|total| seen >= total)
            || next_empty == Some(true)
            || (self.saw_next && next_empty.is_none());
        self.saw_next |= next_empty.is_some();

        if exhausted {
            tracing::debug!(items = count, seen, "last page reached");
            self.state = PageState::Exhausted;
        } else {
            self.offset = self.offset.saturating_add(limit);
            self.state = PageState::Ready;
        }
        Ok(())
    }
}

fn page_items(outcome: Outcome) -> Result<Vec<Value>> {
    let content_type = outcome.header("content-type").map(str::to_string);
    match outcome.into_value() {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(Error::content_decode(
            content_type.as_deref(),
            format!("expected a page of items, got {}", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "an object",
    }
}
