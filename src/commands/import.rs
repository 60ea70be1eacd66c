use crate::Context;
use crate::cli::ImportArgs;
use crate::commands::{connect, state_path};
use crate::state::ProviderState;
use crate::ui;
use anyhow::{Context as _, Result, bail};
use declarative::{Registry, parse_address};
use shoehornkit::Client;

/// Start tracking an existing remote object
pub fn run(ctx: &Context, args: &ImportArgs) -> Result<()> {
    let path = state_path(ctx.state.as_deref())?;
    let mut state = ProviderState::load(&path)?;
    let registry = crate::resource::registry();
    let address = import_address(args)?;

    let client = connect(&ctx.connection)?;
    import(&client, &registry, &mut state, &args.resource_type, &args.id, &address)?;
    state.save(&path)?;

    ui::success(&format!("Imported {} as {address}", args.id));
    Ok(())
}

/// Address to record the instance under
///
/// Defaults to `<type>.<id>`; an explicit address must carry the same type.
fn import_address(args: &ImportArgs) -> Result<String> {
    let address = args
        .address
        .clone()
        .unwrap_or_else(|| format!("{}.{}", args.resource_type, args.id));

    match parse_address(&address) {
        Some((type_name, _)) if type_name == args.resource_type => Ok(address),
        Some((type_name, _)) => bail!(
            "Address {address} names type {type_name}, expected {}",
            args.resource_type
        ),
        None => bail!("Invalid address {address:?}: expected <type>.<name>"),
    }
}

pub fn import(
    client: &Client,
    registry: &Registry<Client>,
    state: &mut ProviderState,
    type_name: &str,
    id: &str,
    address: &str,
) -> Result<()> {
    if state.get(address).is_some() {
        bail!("{address} is already tracked; remove it from state before importing again");
    }

    let resource = registry.require(type_name)?;
    let attributes = resource
        .import_value(client, id)
        .with_context(|| format!("Could not import {type_name} {id:?}"))?;

    log::info!("Imported {type_name} {id} as {address}");
    state.upsert(address, type_name, attributes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{registry, testing::mock_client};
    use serde_json::json;
    use shoehornkit::transport::MockReply;

    fn args(resource_type: &str, id: &str, address: Option<&str>) -> ImportArgs {
        ImportArgs {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            address: address.map(ToString::to_string),
        }
    }

    #[test]
    fn test_default_address() {
        let address = import_address(&args("shoehorn_feature_flag", "new-nav", None)).unwrap();
        assert_eq!(address, "shoehorn_feature_flag.new-nav");
    }

    #[test]
    fn test_address_type_must_match() {
        let err = import_address(&args("shoehorn_team", "t-1", Some("shoehorn_entity.web")))
            .unwrap_err();
        assert!(err.to_string().contains("expected shoehorn_team"));
        assert!(import_address(&args("shoehorn_team", "t-1", Some("platform"))).is_err());
    }

    #[test]
    fn test_import_records_state() {
        let (client, mock) = mock_client();
        mock.push(MockReply::json(
            200,
            &json!({"flags": [
                {"id": "ff-1", "key": "new-nav", "name": "New navigation", "default_enabled": true}
            ]}),
        ));

        let mut state = ProviderState::default();
        import(
            &client,
            &registry(),
            &mut state,
            "shoehorn_feature_flag",
            "new-nav",
            "shoehorn_feature_flag.nav",
        )
        .unwrap();

        let tracked = &state.resources["shoehorn_feature_flag.nav"];
        assert_eq!(tracked.type_name, "shoehorn_feature_flag");
        assert_eq!(tracked.attributes["id"], "ff-1");
        assert_eq!(tracked.attributes["default_enabled"], true);
    }

    #[test]
    fn test_import_unsupported_type() {
        let (client, mock) = mock_client();
        let mut state = ProviderState::default();

        let err = import(
            &client,
            &registry(),
            &mut state,
            "shoehorn_api_key",
            "k-1",
            "shoehorn_api_key.ci",
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("does not support import"));
        assert_eq!(mock.request_count(), 0);
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_already_tracked_is_error() {
        let (client, _mock) = mock_client();
        let mut state = ProviderState::default();
        state.upsert("shoehorn_team.platform", "shoehorn_team", json!({"id": "t-1"}));

        let err = import(
            &client,
            &registry(),
            &mut state,
            "shoehorn_team",
            "t-1",
            "shoehorn_team.platform",
        )
        .unwrap_err();
        assert!(err.to_string().contains("already tracked"));
    }
}
