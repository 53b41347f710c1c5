//! Filterable list handlers and request commands.
//!
//! Every request a list issues runs as an async command bounded by the
//! request timeout. Its outcome comes back as [`AppMsg::ReviewsLoaded`]
//! carrying the list index and the ticket, and the list discards outcomes it
//! no longer waits for. Failures are logged by the list and never reach the
//! screen.

use std::any::Any;
use std::time::Instant;

use bubbletea_rs::Cmd;

use super::ReviewDeckApp;
use crate::error::ReviewError;
use crate::reviews::{Rating, ReviewPage};
use crate::tui::messages::AppMsg;
use crate::widgets::{PendingRequest, Ticket};

impl ReviewDeckApp {
    /// Dispatches list messages to their handlers.
    pub(super) fn handle_list_msg(&mut self, msg: &AppMsg, now: Instant) -> Option<Cmd> {
        match msg {
            AppMsg::ToggleRating(rating) => self.handle_toggle_rating(*rating, now),
            AppMsg::LoadMore => self.handle_load_more(now),
            AppMsg::ReviewsLoaded {
                list,
                ticket,
                result,
            } => self.apply_outcome(*list, *ticket, result.clone(), now),
            _ => {
                debug_assert!(false, "non-list message routed to handle_list_msg");
                None
            }
        }
    }

    /// Issues the filter request for every list whose rendered cards no
    /// longer match its query parameters.
    pub fn startup_requests(&mut self, now: Instant) -> Vec<Cmd> {
        let pending: Vec<(usize, PendingRequest)> = self
            .lists
            .iter_mut()
            .enumerate()
            .filter(|(_, pane)| pane.list.needs_refresh())
            .filter_map(|(index, pane)| pane.list.refresh(now).map(|request| (index, request)))
            .collect();
        pending
            .into_iter()
            .filter_map(|(index, request)| self.request_cmd(index, request, now))
            .collect()
    }

    fn handle_toggle_rating(&mut self, rating: Rating, now: Instant) -> Option<Cmd> {
        let index = self.list_cursor;
        let pending = self.lists.get_mut(index)?.list.toggle_rating(rating, now)?;
        self.request_cmd(index, pending, now)
    }

    fn handle_load_more(&mut self, now: Instant) -> Option<Cmd> {
        let index = self.list_cursor;
        let pending = self.lists.get_mut(index)?.list.load_more(now)?;
        self.request_cmd(index, pending, now)
    }

    fn apply_outcome(
        &mut self,
        index: usize,
        ticket: Ticket,
        outcome: Result<ReviewPage, ReviewError>,
        now: Instant,
    ) -> Option<Cmd> {
        if let Some(pane) = self.lists.get_mut(index) {
            pane.list.complete(ticket, outcome, now);
        }
        None
    }

    /// Runs `pending` against the provider, or fails it at once when no
    /// provider is configured.
    fn request_cmd(&mut self, index: usize, pending: PendingRequest, now: Instant) -> Option<Cmd> {
        let Some(provider) = self.provider.clone() else {
            let error = ReviewError::Configuration {
                message: "no review provider configured".to_owned(),
            };
            return self.apply_outcome(index, pending.ticket, Err(error), now);
        };
        let timeout = self.request_timeout;

        Some(Box::pin(async move {
            let PendingRequest { ticket, query } = pending;
            let result = tokio::time::timeout(timeout, query.run(provider.as_ref()))
                .await
                .unwrap_or_else(|_| {
                    Err(ReviewError::Timeout {
                        after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    })
                });
            Some(Box::new(AppMsg::ReviewsLoaded {
                list: index,
                ticket,
                result,
            }) as Box<dyn Any + Send>)
        }))
    }
}
