use pulse::callbacks::ListResult;
use pulse::context::introspect::{CardInfo, Introspector};
use tracing::debug;

use super::{Collector, Filter, Records};
use crate::model::Card;

/// Card queries.
pub(crate) enum Cards {}

impl Records for Cards {
    type Record = Card;

    const KIND: &'static str = "cards";

    fn request(
        introspect: &Introspector,
        filter: &Filter,
        collector: Collector<Card>,
    ) -> impl Sized + 'static {
        let callback = move |result: ListResult<&CardInfo>| match result {
            ListResult::Item(info) => collector.insert(info.index, Card::from_raw(info)),
            ListResult::End => collector.finish(),
            ListResult::Error => {
                // treated like the end of the list, matching the
                // terminated-early handling in the poll loop
                debug!("card listing ended with a server side error");
                collector.finish();
            }
        };

        match filter {
            Filter::Index(index) => introspect.get_card_info_by_index(*index, callback),
            Filter::Name(name) => introspect.get_card_info_by_name(name, callback),
            Filter::All => introspect.get_card_info_list(callback),
        }
    }
}
