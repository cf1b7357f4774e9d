//! Query adapter around the native pulseaudio client
//!
//! One [`Session`] drives exactly one query: allocate the mainloop and
//! context, poll the mainloop one non-blocking pass at a time, fire the
//! introspection request once the context is ready, and collect the
//! records its callback hands back until the end-of-list signal.

mod cards;
mod sinks;

pub(crate) use cards::Cards;
pub(crate) use sinks::Sinks;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use pulse::context::introspect::Introspector;
use pulse::context::{Context, FlagSet, State};
use pulse::mainloop::standard::{IterateResult, Mainloop};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::QueryError;

/// The server's reserved "no such record" index (`PA_INVALID_INDEX`).
pub(crate) const INVALID_ID: u32 = u32::MAX;

/// Iteration budget for one query. The server normally answers within a
/// handful of passes; the cap guards against an end-of-list signal that
/// never arrives.
const MAX_ITERATIONS: u32 = 10_000;

/// Pause between two mainloop passes.
const ITERATION_PAUSE: Duration = Duration::from_micros(100);

/// One long stall halfway through the budget, giving a slow server a
/// last chance to flush its replies.
const STALL_PAUSE: Duration = Duration::from_secs(2);

/// Record selector for one query.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Filter {
    All,
    Index(u32),
    Name(String),
}

impl Filter {
    /// Interpret the optional second command line argument: all digits
    /// means an index, anything else a name, nothing (or an empty
    /// string) means every record of the kind.
    pub(crate) fn parse(arg: Option<&str>) -> Filter {
        match arg {
            None | Some("") => Filter::All,
            Some(arg) if arg.chars().all(|c| c.is_ascii_digit()) => {
                // an index wider than u32 cannot match any record
                Filter::Index(arg.parse().unwrap_or(INVALID_ID))
            }
            Some(arg) => Filter::Name(arg.to_string()),
        }
    }
}

/// Accumulation state shared between the poll loop and the
/// introspection callback, which fires synchronously from inside
/// [`Mainloop::iterate`].
pub(crate) struct Collector<R> {
    records: Rc<RefCell<BTreeMap<u32, R>>>,
    done: Rc<Cell<bool>>,
}

impl<R> Clone for Collector<R> {
    fn clone(&self) -> Self {
        Self {
            records: Rc::clone(&self.records),
            done: Rc::clone(&self.done),
        }
    }
}

impl<R> Collector<R> {
    fn new() -> Self {
        Self {
            records: Rc::new(RefCell::new(BTreeMap::new())),
            done: Rc::new(Cell::new(false)),
        }
    }

    /// Add one record. A duplicate index overwrites the earlier record;
    /// the server hands out unique indices.
    pub(crate) fn insert(&self, index: u32, record: R) {
        self.records.borrow_mut().insert(index, record);
    }

    /// Note the end-of-list signal.
    pub(crate) fn finish(&self) {
        self.done.set(true);
    }

    fn is_done(&self) -> bool {
        self.done.get()
    }

    fn take(&self) -> BTreeMap<u32, R> {
        self.records.take()
    }
}

/// One record kind the server can be asked about.
pub(crate) trait Records {
    /// Flattened record type placed into the result collection.
    type Record: Serialize + 'static;

    /// Kind keyword used on the command line and in diagnostics.
    const KIND: &'static str;

    /// Issue the fetch operation matching `filter`, wiring its callback
    /// up to `collector`. The returned handle keeps the pending
    /// operation alive until dropped.
    fn request(
        introspect: &Introspector,
        filter: &Filter,
        collector: Collector<Self::Record>,
    ) -> impl Sized + 'static;
}

/// What one query ends with: the collection keyed by record index, or
/// the in-band failure record the UI layer knows to look for.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum QueryOutput<R> {
    Collection(BTreeMap<u32, R>),
    Failure(Failure),
}

#[derive(Debug, Serialize)]
pub(crate) struct Failure {
    success: bool,
    error: String,
}

impl<R> QueryOutput<R> {
    pub(crate) fn empty() -> Self {
        Self::Collection(BTreeMap::new())
    }

    fn failure(reason: &str) -> Self {
        Self::Failure(Failure {
            success: false,
            error: reason.to_string(),
        })
    }
}

/// One connection to the server, alive for exactly one query.
pub(crate) struct Session {
    // declared before the mainloop so teardown unrefs it first
    context: Context,
    mainloop: Mainloop,
}

impl Session {
    /// Allocate the event loop and client context and start connecting
    /// to the default server.
    pub(crate) fn connect() -> Result<Session, QueryError> {
        let mainloop = Mainloop::new().ok_or(QueryError::Mainloop)?;
        let mut context = Context::new(&mainloop, "paquery").ok_or(QueryError::Context)?;
        context.connect(None, FlagSet::NOFLAGS, None)?;
        Ok(Session { context, mainloop })
    }

    /// Drive one query to completion and tear the connection down.
    ///
    /// Ends on the end-of-list signal, on a failed or terminated
    /// context, or when the iteration budget runs out, in which case
    /// whatever has been collected so far is returned.
    pub(crate) fn query<K: Records>(mut self, filter: &Filter) -> QueryOutput<K::Record> {
        debug!(kind = K::KIND, ?filter, "querying the server");

        let collector = Collector::new();
        let mut operation = None;
        let mut failure = None;
        let mut iterations: u32 = 0;

        loop {
            if collector.is_done() {
                debug!("end of list received");
                break;
            }

            match self.context.get_state() {
                State::Failed => {
                    debug!("context failed");
                    failure = Some(QueryOutput::failure("context failed"));
                    break;
                }
                State::Terminated => {
                    debug!("context terminated");
                    failure = Some(QueryOutput::failure("context terminated"));
                    break;
                }
                State::Ready if operation.is_none() => {
                    debug!(kind = K::KIND, "context ready, requesting records");
                    operation = Some(K::request(
                        &self.context.introspect(),
                        filter,
                        collector.clone(),
                    ));
                }
                _ => {}
            }

            if iterations >= MAX_ITERATIONS {
                warn!(
                    iterations,
                    "no end of list before the iteration budget ran out (server bug?)"
                );
                break;
            }
            if iterations > 0 && iterations % (MAX_ITERATIONS / 2) == 0 {
                debug!(iterations, "still waiting, stalling for a moment (server bug?)");
                thread::sleep(STALL_PAUSE);
            }

            if let IterateResult::Err(e) = self.mainloop.iterate(false) {
                // the state checks above decide whether this is fatal
                debug!("mainloop pass failed: {}", e);
            }
            iterations += 1;
            thread::sleep(ITERATION_PAUSE);
        }

        drop(operation);
        self.context.disconnect();
        debug!("query done");

        failure.unwrap_or_else(|| QueryOutput::Collection(collector.take()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse_digits_as_index() {
        assert_eq!(Filter::parse(Some("0")), Filter::Index(0));
        assert_eq!(Filter::parse(Some("17")), Filter::Index(17));
        assert_eq!(Filter::parse(Some("4294967295")), Filter::Index(INVALID_ID));
    }

    #[test]
    fn test_filter_parse_text_as_name() {
        assert_eq!(
            Filter::parse(Some("alsa_output.pci-0000_00_1f.3.analog-stereo")),
            Filter::Name("alsa_output.pci-0000_00_1f.3.analog-stereo".to_string())
        );
        // mixed digits and text is a name too
        assert_eq!(Filter::parse(Some("12a")), Filter::Name("12a".to_string()));
    }

    #[test]
    fn test_filter_parse_missing_or_empty_means_all() {
        assert_eq!(Filter::parse(None), Filter::All);
        assert_eq!(Filter::parse(Some("")), Filter::All);
    }

    #[test]
    fn test_filter_parse_oversized_index_is_invalid() {
        assert_eq!(Filter::parse(Some("99999999999")), Filter::Index(INVALID_ID));
    }

    #[test]
    fn test_collector_overwrites_duplicate_indices() {
        let collector = Collector::new();
        collector.insert(3, "first".to_string());
        collector.insert(3, "second".to_string());
        assert_eq!(collector.take().remove(&3), Some("second".to_string()));
    }

    #[test]
    fn test_collector_done_flag_is_shared() {
        let collector: Collector<String> = Collector::new();
        assert!(!collector.is_done());
        collector.clone().finish();
        assert!(collector.is_done());
    }

    #[test]
    fn test_failure_record_shape() {
        let output: QueryOutput<String> = QueryOutput::failure("context failed");
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"success":false,"error":"context failed"}"#
        );
    }

    #[test]
    fn test_collection_keys_are_stringified_indices() {
        let collector = Collector::new();
        collector.insert(0, "a".to_string());
        collector.insert(1, "b".to_string());
        let output = QueryOutput::Collection(collector.take());
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"0":"a","1":"b"}"#
        );
    }

    #[test]
    fn test_empty_output_is_an_empty_object() {
        let output: QueryOutput<String> = QueryOutput::empty();
        assert_eq!(serde_json::to_string(&output).unwrap(), "{}");
    }
}
