//! Filterable review list with incremental loading.
//!
//! The list owns the selected ratings, the page counter, and the cards on
//! screen. It never performs I/O itself: operations that need data return a
//! [`PendingRequest`] for the host to run, and the host feeds the outcome
//! back through [`ReviewList::complete`] together with the request's
//! [`Ticket`].
//!
//! Only one request is live at a time. Toggling a rating while a request is
//! outstanding supersedes it: the new filter request is issued at once and
//! the superseded response is dropped when it arrives, so the cards on screen
//! always match the selected ratings. Load-more is ignored while loading.
//!
//! A list attached to [stale](crate::reviews::ListMarkup::stale) markup
//! discards the server-rendered cards and waits for the host to run
//! [`ReviewList::refresh`], so pagination never mixes page sizes or rating
//! sets.

use std::time::{Duration, Instant};

use crate::error::ReviewError;
use crate::reviews::{
    FilterRequest, ListMarkup, LoadMoreRequest, Rating, RatingSet, ReviewCard, ReviewPage,
    ReviewProvider,
};
use crate::telemetry::RequestKind;

/// Delay between revealing consecutive cards of one batch.
pub const REVEAL_STAGGER: Duration = Duration::from_millis(50);
/// Label of the load-more control while idle.
pub const LOAD_MORE_LABEL: &str = "Load More";
/// Label of the load-more control while a request runs.
pub const LOADING_LABEL: &str = "Loading...";
/// Placeholder shown when no card matches and the server sent no notice.
pub const NO_RESULTS_NOTICE: &str = "No reviews found matching your filters.";

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Data request the host must perform for the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewQuery {
    /// Replace the list with the first page for a rating set.
    Filter(FilterRequest),
    /// Append the next page.
    LoadMore(LoadMoreRequest),
}

impl ReviewQuery {
    /// Endpoint this query targets.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::Filter(_) => RequestKind::Filter,
            Self::LoadMore(_) => RequestKind::LoadMore,
        }
    }

    /// Runs the query against `provider`.
    ///
    /// # Errors
    ///
    /// Propagates the provider's transport failure.
    pub async fn run(&self, provider: &dyn ReviewProvider) -> Result<ReviewPage, ReviewError> {
        match self {
            Self::Filter(request) => provider.filter(request).await,
            Self::LoadMore(request) => provider.load_more(request).await,
        }
    }
}

/// A query paired with the ticket its response must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// Ticket to hand back to [`ReviewList::complete`].
    pub ticket: Ticket,
    /// What to fetch.
    pub query: ReviewQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    ticket: Ticket,
    kind: RequestKind,
    deadline: Instant,
}

/// A card on screen together with its reveal schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedCard {
    /// The review.
    pub card: ReviewCard,
    /// Whether the card has faded in.
    pub revealed: bool,
    reveal_at: Instant,
}

/// Presentation state of the load-more control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMoreControl {
    /// Whether the control is shown at all.
    pub visible: bool,
    /// Whether the control accepts input.
    pub enabled: bool,
    /// Text on the control.
    pub label: &'static str,
}

/// State of one filterable list widget.
#[derive(Debug)]
pub struct ReviewList {
    staff_id: u64,
    per_page: u32,
    request_timeout: Duration,
    selected: RatingSet,
    current_page: u32,
    has_more: bool,
    in_flight: Option<InFlight>,
    cards: Vec<ListedCard>,
    notice: Option<String>,
    next_ticket: u64,
    awaiting_refresh: bool,
    disposed: bool,
}

impl ReviewList {
    /// Attaches a list to its server-rendered initial state.
    ///
    /// Initial cards are shown immediately, unless the markup is stale: then
    /// the list starts empty and [`ReviewList::needs_refresh`] reports that
    /// its first page must be fetched. Requests that get no response within
    /// `request_timeout` are treated as failed.
    #[must_use]
    pub fn attach(markup: ListMarkup, request_timeout: Duration, now: Instant) -> Self {
        let ListMarkup {
            per_page,
            staff_id,
            has_more,
            selected,
            cards,
            notice,
            stale,
            ..
        } = markup;
        tracing::debug!(
            staff_id,
            per_page,
            ratings = %selected,
            has_more,
            stale,
            "review list attached"
        );
        let cards = if stale {
            Vec::new()
        } else {
            cards
                .into_iter()
                .map(|card| ListedCard {
                    card,
                    revealed: true,
                    reveal_at: now,
                })
                .collect()
        };
        Self {
            staff_id,
            per_page: per_page.max(1),
            request_timeout,
            selected,
            current_page: 1,
            has_more: has_more && !stale,
            in_flight: None,
            cards,
            notice: if stale { None } else { notice },
            next_ticket: 0,
            awaiting_refresh: stale,
            disposed: false,
        }
    }

    /// Refetches the first page for the current ratings, superseding any
    /// outstanding request. Returns `None` only after disposal.
    pub fn refresh(&mut self, now: Instant) -> Option<PendingRequest> {
        if self.disposed {
            return None;
        }
        self.current_page = 1;
        let query = ReviewQuery::Filter(FilterRequest {
            staff_id: self.staff_id,
            ratings: self.selected,
            per_page: self.per_page,
        });
        Some(self.issue(query, now))
    }

    /// Checks or unchecks `rating` and refilters from the first page.
    ///
    /// Any outstanding request is superseded. Returns `None` only after
    /// disposal.
    pub fn toggle_rating(&mut self, rating: Rating, now: Instant) -> Option<PendingRequest> {
        if self.disposed {
            return None;
        }
        if !self.selected.insert(rating) {
            self.selected.remove(rating);
        }

        if let Some(superseded) = self.in_flight {
            tracing::debug!(
                ticket = superseded.ticket.0,
                kind = ?superseded.kind,
                "superseding outstanding review request"
            );
        }
        self.refresh(now)
    }

    /// Requests the next page.
    ///
    /// Ignored while a request is outstanding, when the server reported no
    /// further results, and after disposal.
    pub fn load_more(&mut self, now: Instant) -> Option<PendingRequest> {
        if self.disposed || self.in_flight.is_some() || !self.has_more {
            return None;
        }
        self.current_page = self.current_page.saturating_add(1);
        let offset =
            u64::from(self.current_page.saturating_sub(1)).saturating_mul(u64::from(self.per_page));

        let query = ReviewQuery::LoadMore(LoadMoreRequest {
            staff_id: self.staff_id,
            ratings: self.selected,
            offset,
            per_page: self.per_page,
        });
        Some(self.issue(query, now))
    }

    fn issue(&mut self, query: ReviewQuery, now: Instant) -> PendingRequest {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket = self.next_ticket.saturating_add(1);
        self.in_flight = Some(InFlight {
            ticket,
            kind: query.kind(),
            deadline: now + self.request_timeout,
        });
        PendingRequest { ticket, query }
    }

    /// Applies the outcome of the request identified by `ticket`.
    ///
    /// Outcomes for superseded or timed-out requests are ignored. Returns
    /// whether the outcome was applied.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<ReviewPage, ReviewError>,
        now: Instant,
    ) -> bool {
        let Some(request) = self.in_flight.filter(|live| live.ticket == ticket && !self.disposed)
        else {
            tracing::debug!(ticket = ticket.0, "ignoring response for a superseded request");
            return false;
        };
        self.in_flight = None;

        match outcome {
            Ok(page) => {
                if request.kind == RequestKind::Filter {
                    self.awaiting_refresh = false;
                }
                self.apply_page(request.kind, page, now);
            }
            Err(error) => self.fail(request.kind, &error),
        }
        true
    }

    fn apply_page(&mut self, kind: RequestKind, page: ReviewPage, now: Instant) {
        let ReviewPage {
            cards,
            notice,
            has_more,
        } = page;

        let fresh: Vec<ReviewCard> = match kind {
            RequestKind::Filter => {
                self.cards.clear();
                cards
            }
            RequestKind::LoadMore => cards
                .into_iter()
                .filter(|card| !self.is_listed(card))
                .collect(),
        };

        let mut reveal_at = now;
        for card in fresh {
            self.cards.push(ListedCard {
                card,
                revealed: false,
                reveal_at,
            });
            reveal_at += REVEAL_STAGGER;
        }

        self.has_more = has_more;
        if kind == RequestKind::Filter || notice.is_some() {
            self.notice = notice;
        }
        self.reveal_due(now);
    }

    fn is_listed(&self, card: &ReviewCard) -> bool {
        card.id.is_some_and(|id| {
            self.cards
                .iter()
                .any(|listed| listed.card.id == Some(id))
        })
    }

    fn fail(&mut self, kind: RequestKind, error: &ReviewError) {
        if kind == RequestKind::LoadMore {
            self.current_page = self.current_page.saturating_sub(1).max(1);
        }
        tracing::warn!(?kind, page = self.current_page, "review request failed: {error}");
    }

    /// Reveals cards whose stagger delay has passed and enforces the request
    /// deadline. Returns whether anything visible changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        let mut changed = self.reveal_due(now);
        if let Some(expired) = self.in_flight.filter(|live| live.deadline <= now) {
            let after_ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);
            changed |= self.complete(
                expired.ticket,
                Err(ReviewError::Timeout { after_ms }),
                now,
            );
        }
        changed
    }

    fn reveal_due(&mut self, now: Instant) -> bool {
        let mut revealed_any = false;
        for listed in self
            .cards
            .iter_mut()
            .filter(|listed| !listed.revealed && listed.reveal_at <= now)
        {
            listed.revealed = true;
            revealed_any = true;
        }
        revealed_any
    }

    /// Stops accepting input and drops any outstanding request. Safe to call
    /// repeatedly; returns true only on the first call.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.in_flight = None;
        tracing::debug!("review list disposed");
        true
    }

    /// Ratings whose filters are checked.
    #[must_use]
    pub const fn selected(&self) -> RatingSet {
        self.selected
    }

    /// One-based index of the last requested page.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Page size sent with every request.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Staff filter sent with every request.
    #[must_use]
    pub const fn staff_id(&self) -> u64 {
        self.staff_id
    }

    /// Whether the server reported further results.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a request is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Ticket of the outstanding request, if any.
    #[must_use]
    pub fn live_ticket(&self) -> Option<Ticket> {
        self.in_flight.map(|live| live.ticket)
    }

    /// Whether the list was attached to stale markup and no first page has
    /// been requested for it yet.
    #[must_use]
    pub const fn needs_refresh(&self) -> bool {
        self.awaiting_refresh && self.in_flight.is_none() && !self.disposed
    }

    /// Whether [`ReviewList::dispose`] has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether the loading overlay covers the list (a filter request is
    /// outstanding).
    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.in_flight
            .is_some_and(|live| live.kind == RequestKind::Filter)
    }

    /// Every card on screen, including ones still waiting to fade in.
    #[must_use]
    pub fn cards(&self) -> &[ListedCard] {
        &self.cards
    }

    /// Cards that have been revealed.
    pub fn revealed_cards(&self) -> impl Iterator<Item = &ReviewCard> {
        self.cards
            .iter()
            .filter(|listed| listed.revealed)
            .map(|listed| &listed.card)
    }

    /// Placeholder text, shown only when no card is listed and the list is
    /// not still waiting for its first page.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        if !self.cards.is_empty() || self.awaiting_refresh {
            return None;
        }
        Some(self.notice.as_deref().unwrap_or(NO_RESULTS_NOTICE))
    }

    /// Presentation state of the load-more control. It is disabled and
    /// relabelled while any request is outstanding.
    #[must_use]
    pub const fn load_more_control(&self) -> LoadMoreControl {
        let loading = self.in_flight.is_some();
        LoadMoreControl {
            visible: self.has_more && !self.disposed,
            enabled: !loading,
            label: if loading { LOADING_LABEL } else { LOAD_MORE_LABEL },
        }
    }
}

#[cfg(test)]
#[path = "review_list_tests.rs"]
mod tests;
