use pulse::callbacks::ListResult;
use pulse::context::introspect::{Introspector, SinkInfo};
use tracing::debug;

use super::{Collector, Filter, Records};
use crate::model::Sink;

/// Sink (output device) queries.
pub(crate) enum Sinks {}

impl Records for Sinks {
    type Record = Sink;

    const KIND: &'static str = "sinks";

    fn request(
        introspect: &Introspector,
        filter: &Filter,
        collector: Collector<Sink>,
    ) -> impl Sized + 'static {
        let callback = move |result: ListResult<&SinkInfo>| match result {
            ListResult::Item(info) => collector.insert(info.index, Sink::from_raw(info)),
            ListResult::End => collector.finish(),
            ListResult::Error => {
                debug!("sink listing ended with a server side error");
                collector.finish();
            }
        };

        match filter {
            Filter::Index(index) => introspect.get_sink_info_by_index(*index, callback),
            Filter::Name(name) => introspect.get_sink_info_by_name(name, callback),
            Filter::All => introspect.get_sink_info_list(callback),
        }
    }
}
