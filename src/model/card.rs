use std::collections::BTreeMap;

use pulse::context::introspect::CardInfo;
use pulse::direction;
use pulse::proplist::{properties, Proplist};
use serde::Serialize;

use super::{alsa_card_id, available_flag, prop};

/// One sound card as reported by the server.
#[derive(Debug, Serialize)]
pub(crate) struct Card {
    pub index: u32,
    #[serde(rename = "alsaCard")]
    pub alsa_card: Option<i32>,
    pub name: String,
    pub description: String,
    pub active_profile: Option<String>,
    pub profiles: BTreeMap<String, Profile>,
    pub ports: BTreeMap<String, CardPort>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Profile {
    pub name: String,
    pub description: String,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CardPort {
    pub name: String,
    pub description: String,
    pub direction: PortDirection,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PortDirection {
    Out,
    In,
}

impl PortDirection {
    pub(crate) fn from_raw(raw: direction::FlagSet) -> Self {
        if raw == direction::FlagSet::OUTPUT {
            Self::Out
        } else {
            Self::In
        }
    }
}

impl Card {
    /// Flatten one raw card record. Entries of the profile and port
    /// tables that arrive without a name are skipped.
    pub(crate) fn from_raw(info: &CardInfo) -> Card {
        let name = info.name.as_deref().unwrap_or_default().to_string();

        let mut profiles = BTreeMap::new();
        for profile in &info.profiles {
            let Some(profile_name) = profile.name.as_deref() else {
                continue;
            };
            profiles.insert(
                profile_name.to_string(),
                Profile {
                    name: profile_name.to_string(),
                    description: profile.description.as_deref().unwrap_or_default().to_string(),
                    available: profile.available,
                },
            );
        }

        let mut ports = BTreeMap::new();
        for port in &info.ports {
            let Some(port_name) = port.name.as_deref() else {
                continue;
            };
            ports.insert(
                port_name.to_string(),
                CardPort {
                    name: port_name.to_string(),
                    description: port.description.as_deref().unwrap_or_default().to_string(),
                    direction: PortDirection::from_raw(port.direction),
                    available: available_flag(port.available),
                },
            );
        }

        Card {
            index: info.index,
            alsa_card: alsa_card_id(&info.proplist),
            description: describe(&info.proplist, &name),
            name,
            active_profile: info
                .active_profile
                .as_ref()
                .and_then(|profile| profile.name.as_deref())
                .map(String::from),
            profiles,
            ports,
        }
    }
}

/// Human readable card label: the `device.description` property, else
/// the ALSA card name, else the server side name.
fn describe(proplist: &Proplist, name: &str) -> String {
    prop(proplist, properties::DEVICE_DESCRIPTION)
        .or_else(|| prop(proplist, "alsa.card_name"))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proplist(pairs: &[(&str, &str)]) -> Proplist {
        let mut list = Proplist::new().unwrap();
        for (key, value) in pairs {
            list.set_str(key, value).unwrap();
        }
        list
    }

    #[test]
    fn test_describe_prefers_device_description() {
        let list = proplist(&[
            ("device.description", "Built-in Audio"),
            ("alsa.card_name", "HDA Intel PCH"),
        ]);
        assert_eq!(describe(&list, "alsa_card.pci-0000"), "Built-in Audio");
    }

    #[test]
    fn test_describe_falls_back_to_alsa_card_name() {
        let list = proplist(&[("alsa.card_name", "HDA Intel PCH")]);
        assert_eq!(describe(&list, "alsa_card.pci-0000"), "HDA Intel PCH");
    }

    #[test]
    fn test_describe_falls_back_to_raw_name() {
        assert_eq!(describe(&proplist(&[]), "alsa_card.pci-0000"), "alsa_card.pci-0000");
        // an empty property is the same as a missing one
        let list = proplist(&[("device.description", "")]);
        assert_eq!(describe(&list, "alsa_card.pci-0000"), "alsa_card.pci-0000");
    }

    #[test]
    fn test_direction_mapping() {
        assert_eq!(
            PortDirection::from_raw(direction::FlagSet::OUTPUT),
            PortDirection::Out
        );
        assert_eq!(
            PortDirection::from_raw(direction::FlagSet::INPUT),
            PortDirection::In
        );
    }

    #[test]
    fn test_card_serializes_with_ui_field_names() {
        let mut ports = BTreeMap::new();
        ports.insert(
            "analog-output".to_string(),
            CardPort {
                name: "analog-output".to_string(),
                description: "Analog Output".to_string(),
                direction: PortDirection::Out,
                available: None,
            },
        );

        let card = Card {
            index: 0,
            alsa_card: Some(1),
            name: "alsa_card.pci-0000".to_string(),
            description: "Built-in Audio".to_string(),
            active_profile: None,
            profiles: BTreeMap::new(),
            ports,
        };

        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            json!({
                "index": 0,
                "alsaCard": 1,
                "name": "alsa_card.pci-0000",
                "description": "Built-in Audio",
                "active_profile": null,
                "profiles": {},
                "ports": {
                    "analog-output": {
                        "name": "analog-output",
                        "description": "Analog Output",
                        "direction": "out",
                        // the undetermined state stays visible
                        "available": null,
                    },
                },
            })
        );
    }
}
