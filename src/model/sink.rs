use std::collections::BTreeMap;

use pulse::context::introspect::SinkInfo;
use pulse::proplist::{properties, Proplist};
use serde::Serialize;

use super::{alsa_card_id, available_flag, prop};

/// One sink (output device) as reported by the server.
#[derive(Debug, Serialize)]
pub(crate) struct Sink {
    pub index: u32,
    #[serde(rename = "alsaCard")]
    pub alsa_card: Option<i32>,
    pub name: String,
    pub description: String,
    /// Index of the owning card, when the sink belongs to one
    pub card: Option<u32>,
    pub active_port: Option<String>,
    pub ports: BTreeMap<String, SinkPort>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SinkPort {
    pub name: String,
    pub description: String,
    /// Native port type code, passed through for the UI to classify
    #[serde(rename = "type")]
    pub port_type: u32,
    pub available: Option<bool>,
}

impl Sink {
    /// Flatten one raw sink record. Port table entries without a name
    /// are skipped.
    pub(crate) fn from_raw(info: &SinkInfo) -> Sink {
        let name = info.name.as_deref().unwrap_or_default().to_string();

        let mut ports = BTreeMap::new();
        for port in &info.ports {
            let Some(port_name) = port.name.as_deref() else {
                continue;
            };
            ports.insert(
                port_name.to_string(),
                SinkPort {
                    name: port_name.to_string(),
                    description: port.description.as_deref().unwrap_or_default().to_string(),
                    port_type: port.r#type as u32,
                    available: available_flag(port.available),
                },
            );
        }

        Sink {
            index: info.index,
            alsa_card: alsa_card_id(&info.proplist),
            description: describe(info.description.as_deref(), &info.proplist, &name),
            name,
            card: info.card,
            active_port: info
                .active_port
                .as_ref()
                .and_then(|port| port.name.as_deref())
                .map(String::from),
            ports,
        }
    }
}

/// Sinks usually carry their own description; fall back to the
/// `device.description` property and finally the server side name.
fn describe(own: Option<&str>, proplist: &Proplist, name: &str) -> String {
    own.filter(|value| !value.is_empty())
        .map(String::from)
        .or_else(|| prop(proplist, properties::DEVICE_DESCRIPTION))
        .unwrap_or_else(|| name.to_string())
}
