//! Occupation-request ticket workflow.
//!
//! Requests track a linear state history (never interval surgery): each
//! transition appends a state instant, transitions to the current state
//! are ignored, and comments thread below the request with per-party
//! unread counters.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::{Result, SpaceError};
use crate::model::{RequestId, SpaceId, Timestamp, UserId};

/// Lifecycle state of an occupation request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RequestState {
    /// Just filed, nobody has picked it up.
    New,
    /// Under discussion.
    Open,
    /// Answered and closed.
    Resolved,
}

/// One state transition, recorded at the instant it happened.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StateInstant {
    /// State entered.
    pub state: RequestState,
    /// When it was entered.
    pub at: Timestamp,
}

/// One comment in a request's thread.
#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    /// Comment subject line.
    pub subject: String,
    /// Comment body.
    pub description: String,
    /// Who wrote it.
    pub author: UserId,
    /// When it was written.
    pub at: Timestamp,
}

/// A request to occupy a space, with its comment thread and state history.
#[derive(Clone, Debug)]
pub struct OccupationRequest {
    id: RequestId,
    identification: u32,
    requestor: UserId,
    owner: Option<UserId>,
    campus: Option<SpaceId>,
    instant: Timestamp,
    comments: Vec<Comment>,
    states: Vec<StateInstant>,
    requestor_read: usize,
    staff_read: usize,
}

impl OccupationRequest {
    fn new(
        id: RequestId,
        identification: u32,
        requestor: UserId,
        campus: Option<SpaceId>,
        subject: String,
        description: String,
        at: Timestamp,
    ) -> Self {
        Self {
            id,
            identification,
            requestor,
            owner: None,
            campus,
            instant: at,
            comments: vec![Comment {
                subject,
                description,
                author: requestor,
                at,
            }],
            states: vec![StateInstant {
                state: RequestState::New,
                at,
            }],
            // The requestor wrote the first comment and has read it.
            requestor_read: 1,
            staff_read: 0,
        }
    }

    /// Internal request identifier.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Public, monotonically increasing identification number.
    pub fn identification(&self) -> u32 {
        self.identification
    }

    /// User who filed the request.
    pub fn requestor(&self) -> UserId {
        self.requestor
    }

    /// Staff member currently handling the request.
    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    /// Campus the request targets; `None` means any campus.
    pub fn campus(&self) -> Option<SpaceId> {
        self.campus
    }

    /// Instant the request was filed.
    pub fn instant(&self) -> Timestamp {
        self.instant
    }

    /// Comment thread, oldest first.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// State history, in transition order.
    pub fn states(&self) -> &[StateInstant] {
        &self.states
    }

    /// State the request is in now.
    pub fn current_state(&self) -> RequestState {
        self.states
            .iter()
            .enumerate()
            .max_by_key(|(i, s)| (s.at, *i))
            .map(|(_, s)| s.state)
            .unwrap_or(RequestState::New)
    }

    /// State entered exactly at `instant`, if any transition happened then.
    pub fn state_at(&self, instant: Timestamp) -> Option<RequestState> {
        self.states
            .iter()
            .find(|s| s.at == instant)
            .map(|s| s.state)
    }

    /// Instant of the most recent comment.
    pub fn most_recent_comment_instant(&self) -> Timestamp {
        self.comments.iter().map(|c| c.at).max().unwrap_or(self.instant)
    }

    /// The comment filed together with the request.
    pub fn first_comment(&self) -> Option<&Comment> {
        self.comments.iter().find(|c| c.at == self.instant)
    }

    /// Request subject: the first comment's subject, or the
    /// identification number when it is empty.
    pub fn subject(&self) -> String {
        match self.first_comment() {
            Some(c) if !c.subject.is_empty() => c.subject.clone(),
            _ => self.identification.to_string(),
        }
    }

    /// Request description: the first comment's body, or the internal id
    /// when it is empty.
    pub fn description(&self) -> String {
        match self.first_comment() {
            Some(c) if !c.description.is_empty() => c.description.clone(),
            _ => self.id.to_string(),
        }
    }

    /// Subject line used for follow-up comments.
    pub fn follow_up_subject(&self) -> String {
        let mut subject = String::from("Re: ");
        if let Some(first) = self.first_comment() {
            subject.push_str(&first.subject);
        }
        subject
    }

    /// Comments `user` has not seen yet.
    pub fn unread_comments(&self, user: UserId) -> usize {
        if self.owner == Some(user) {
            self.comments.len().saturating_sub(self.staff_read)
        } else if user == self.requestor {
            self.comments.len().saturating_sub(self.requestor_read)
        } else {
            0
        }
    }

    /// Filing instant formatted as `dd/mm/yyyy hh:mm`.
    pub fn presentation_instant(&self) -> Result<String> {
        let nanos = i128::from(self.instant) * 1_000_000;
        let datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|_| SpaceError::InvalidArgument(format!(
                "unrepresentable instant {}",
                self.instant
            )))?;
        let format = format_description!("[day]/[month]/[year] [hour]:[minute]");
        datetime
            .format(&format)
            .map_err(|_| SpaceError::InvalidArgument("unformattable instant".into()))
    }

    /// Adds a follow-up comment, updating whichever party's read counter
    /// the author represents. A staff comment also claims ownership.
    pub fn add_comment(&mut self, description: impl Into<String>, author: UserId, at: Timestamp) {
        self.push_comment(description.into(), author, at);
        if author == self.requestor {
            self.requestor_read = self.comments.len();
        } else {
            self.set_owner(author);
            self.staff_read = self.comments.len();
        }
    }

    /// Requestor follow-up that reopens the request.
    pub fn add_comment_and_open(
        &mut self,
        description: impl Into<String>,
        author: UserId,
        at: Timestamp,
    ) {
        self.transition_to(RequestState::Open, at);
        self.push_comment(description.into(), author, at);
        self.requestor_read = self.comments.len();
    }

    /// Staff answer that resolves the request and claims ownership.
    pub fn add_comment_and_close(
        &mut self,
        description: impl Into<String>,
        author: UserId,
        at: Timestamp,
    ) {
        self.push_comment(description.into(), author, at);
        self.transition_to(RequestState::Resolved, at);
        self.set_owner(author);
        self.staff_read = self.comments.len();
    }

    /// Opens the request on behalf of `user`, who becomes its owner.
    pub fn open(&mut self, at: Timestamp, user: UserId) {
        self.transition_to(RequestState::Open, at);
        self.claim(user);
    }

    /// Resolves the request on behalf of `user`, who becomes its owner.
    pub fn close(&mut self, at: Timestamp, user: UserId) {
        self.transition_to(RequestState::Resolved, at);
        self.claim(user);
    }

    fn claim(&mut self, user: UserId) {
        if self.owner != Some(user) {
            // A new owner starts with the whole thread unread.
            self.staff_read = 0;
            self.set_owner(user);
        }
    }

    fn transition_to(&mut self, state: RequestState, at: Timestamp) {
        if self.current_state() != state {
            self.states.push(StateInstant { state, at });
        }
    }

    fn push_comment(&mut self, description: String, author: UserId, at: Timestamp) {
        let subject = self.follow_up_subject();
        self.comments.push(Comment {
            subject,
            description,
            author,
            at,
        });
    }

    fn set_owner(&mut self, owner: UserId) {
        // The requestor can never own their own request.
        if owner != self.requestor {
            self.owner = Some(owner);
        }
    }

    fn matches_campus(&self, campus: Option<SpaceId>) -> bool {
        campus.is_none_or(|c| self.campus.is_none_or(|own| own == c))
    }
}

/// Owns all occupation requests and answers the workflow queries.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    requests: BTreeMap<RequestId, OccupationRequest>,
    next_id: u64,
}

impl RequestRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a new request. Rejects an exact duplicate (same requestor,
    /// subject and description as an existing request's first comment).
    pub fn open_request(
        &mut self,
        requestor: UserId,
        subject: impl Into<String>,
        description: impl Into<String>,
        campus: Option<SpaceId>,
        at: Timestamp,
    ) -> Result<RequestId> {
        let subject = subject.into();
        let description = description.into();
        let duplicate = self.requests.values().any(|r| {
            r.requestor == requestor
                && r.first_comment().is_some_and(|c| {
                    c.subject == subject && c.description == description
                })
        });
        if duplicate {
            return Err(SpaceError::InvalidArgument(
                "an identical request already exists".into(),
            ));
        }
        let identification = self
            .requests
            .values()
            .map(|r| r.identification)
            .max()
            .unwrap_or(0)
            + 1;
        self.next_id += 1;
        let id = RequestId(self.next_id);
        let request =
            OccupationRequest::new(id, identification, requestor, campus, subject, description, at);
        debug!(request = %id, identification, "request.open");
        self.requests.insert(id, request);
        Ok(id)
    }

    /// Looks a request up by internal id.
    pub fn get(&self, id: RequestId) -> Result<&OccupationRequest> {
        self.requests.get(&id).ok_or(SpaceError::NotFound("request"))
    }

    /// Mutable access to a request.
    pub fn get_mut(&mut self, id: RequestId) -> Result<&mut OccupationRequest> {
        self.requests
            .get_mut(&id)
            .ok_or(SpaceError::NotFound("request"))
    }

    /// Looks a request up by public identification number.
    pub fn by_identification(&self, identification: u32) -> Option<&OccupationRequest> {
        self.requests
            .values()
            .find(|r| r.identification == identification)
    }

    /// Requests currently in `state` for `campus`, newest first.
    /// `campus: None` matches every campus.
    pub fn in_state(
        &self,
        state: RequestState,
        campus: Option<SpaceId>,
    ) -> Vec<&OccupationRequest> {
        let mut out: Vec<&OccupationRequest> = self
            .requests
            .values()
            .filter(|r| r.current_state() == state && r.matches_campus(campus))
            .collect();
        out.sort_by_key(|r| Reverse((r.instant, r.id)));
        out
    }

    /// Resolved requests for `campus`, ordered by their most recent
    /// comment, oldest first.
    pub fn resolved_by_recent_comment(&self, campus: Option<SpaceId>) -> Vec<&OccupationRequest> {
        let mut out: Vec<&OccupationRequest> = self
            .requests
            .values()
            .filter(|r| r.current_state() == RequestState::Resolved && r.matches_campus(campus))
            .collect();
        out.sort_by_key(|r| (r.most_recent_comment_instant(), r.id));
        out
    }

    /// Requests in `state` for `campus` not owned by `owner`, oldest
    /// first. Unowned requests are included.
    pub fn in_state_excluding_owner(
        &self,
        state: RequestState,
        owner: UserId,
        campus: Option<SpaceId>,
    ) -> Vec<&OccupationRequest> {
        let mut out: Vec<&OccupationRequest> = self
            .requests
            .values()
            .filter(|r| {
                r.current_state() == state
                    && r.owner != Some(owner)
                    && r.matches_campus(campus)
            })
            .collect();
        out.sort_by_key(|r| (r.instant, r.id));
        out
    }

    /// Number of requests ever filed.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether any request has been filed.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
