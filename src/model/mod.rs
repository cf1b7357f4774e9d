//! Flattened records handed to the UI layer, one file per record kind

use pulse::def::PortAvailable;
use pulse::proplist::Proplist;

mod card;
mod sink;

pub(crate) use card::Card;
pub(crate) use sink::Sink;

/// Property lookup that treats an empty value the same as a missing one.
pub(crate) fn prop(proplist: &Proplist, key: &str) -> Option<String> {
    proplist.get_str(key).filter(|value| !value.is_empty())
}

/// Numeric ALSA card id, if the record carries a usable `alsa.card` property.
pub(crate) fn alsa_card_id(proplist: &Proplist) -> Option<i32> {
    prop(proplist, "alsa.card").and_then(|id| id.parse().ok())
}

/// Collapse the server's availability report into true/false/unknown.
///
/// The unknown state is kept as an explicit `null` in the output, it is
/// never dropped from the record.
pub(crate) fn available_flag(state: PortAvailable) -> Option<bool> {
    match state {
        PortAvailable::Yes => Some(true),
        PortAvailable::No => Some(false),
        PortAvailable::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proplist(pairs: &[(&str, &str)]) -> Proplist {
        let mut list = Proplist::new().unwrap();
        for (key, value) in pairs {
            list.set_str(key, value).unwrap();
        }
        list
    }

    #[test]
    fn test_prop_skips_missing_and_empty() {
        let list = proplist(&[("device.description", ""), ("alsa.card_name", "HDA Intel")]);
        assert_eq!(prop(&list, "device.description"), None);
        assert_eq!(prop(&list, "no.such.key"), None);
        assert_eq!(prop(&list, "alsa.card_name"), Some("HDA Intel".to_string()));
    }

    #[test]
    fn test_alsa_card_id() {
        assert_eq!(alsa_card_id(&proplist(&[("alsa.card", "1")])), Some(1));
        assert_eq!(alsa_card_id(&proplist(&[("alsa.card", "0")])), Some(0));
        assert_eq!(alsa_card_id(&proplist(&[("alsa.card", "snd_hda")])), None);
        assert_eq!(alsa_card_id(&proplist(&[])), None);
    }

    #[test]
    fn test_available_flag_is_tristate() {
        assert_eq!(available_flag(PortAvailable::Yes), Some(true));
        assert_eq!(available_flag(PortAvailable::No), Some(false));
        assert_eq!(available_flag(PortAvailable::Unknown), None);
    }
}
