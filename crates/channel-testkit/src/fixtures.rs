//! Config-transaction envelope fixtures

use crate::identities::{ORG1_MSP, ORG2_MSP};
use channel_core::config_update::{ConfigValue, HeaderKind};
use channel_core::{
    extract_channel_config, ChannelConfigUpdate, ConfigGroup, ConfigTxEnvelope, ConfigUpdate,
};

/// Consortium the fixture channels belong to
pub const CONSORTIUM: &str = "SampleConsortium";

fn org_group() -> ConfigGroup {
    ConfigGroup::default()
}

/// Config update creating `channel` with both peer organizations
pub fn config_update(channel: &str) -> ConfigUpdate {
    let mut read_application = ConfigGroup::default();
    read_application.groups.insert(ORG1_MSP.to_string(), org_group());
    read_application.groups.insert(ORG2_MSP.to_string(), org_group());

    let mut write_application = read_application.clone();
    write_application.version = 1;
    write_application.mod_policy = "Admins".to_string();

    let mut read_set = ConfigGroup::default();
    read_set.values.insert(
        "Consortium".to_string(),
        ConfigValue {
            version: 0,
            value: CONSORTIUM.as_bytes().to_vec(),
            mod_policy: String::new(),
        },
    );
    read_set
        .groups
        .insert("Application".to_string(), read_application);

    let mut write_set = read_set.clone();
    write_set
        .groups
        .insert("Application".to_string(), write_application);

    ConfigUpdate {
        channel_id: channel.to_string(),
        read_set,
        write_set,
    }
}

/// Raw envelope bytes as a configtx tool would write them
pub fn envelope_bytes(channel: &str) -> Vec<u8> {
    let update = config_update(channel).encode().unwrap();
    ConfigTxEnvelope::wrap(channel, update).encode().unwrap()
}

/// Envelope whose header carries a different payload kind
pub fn wrong_kind_envelope_bytes(channel: &str) -> Vec<u8> {
    let update = config_update(channel).encode().unwrap();
    let mut envelope = ConfigTxEnvelope::wrap(channel, update);
    envelope.header.kind = HeaderKind::EndorserTransaction;
    envelope.encode().unwrap()
}

/// Bytes that are not an envelope at all
pub fn malformed_envelope_bytes() -> Vec<u8> {
    b"definitely not a config transaction".to_vec()
}

/// Extracted config update for `channel`
pub fn channel_config(channel: &str) -> ChannelConfigUpdate {
    extract_channel_config(&envelope_bytes(channel)).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use channel_core::DeltaKind;

    #[test]
    fn test_fixture_envelope_extracts() {
        let config = channel_config("mychannel");
        assert_eq!(config.channel_id(), "mychannel");

        let delta = config.delta();
        assert!(delta
            .iter()
            .any(|e| e.path == "Channel/Application" && e.kind == DeltaKind::Group));
    }

    #[test]
    fn test_broken_fixtures_do_not_extract() {
        assert!(extract_channel_config(&malformed_envelope_bytes()).is_err());
        assert!(extract_channel_config(&wrong_kind_envelope_bytes("mychannel")).is_err());
    }
}
