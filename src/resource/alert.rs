use crate::{
    error::{ProviderError, Result},
    kibana::{api, version::ensure_supported},
    metrics::{
        Status,
        resource::{Operation, operation_timer, record_operation},
    },
    resource::{
        ProviderContext, ResourceData,
        mapper::{AlertConfig, flatten_alert},
    },
    schema::kibana_alert_schema,
};

/// Name of the resource type as exposed to the host framework
pub const RESOURCE_TYPE: &str = "kibana_alert";

fn observe<T>(operation: Operation, result: Result<T>) -> Result<T> {
    let status = match result {
        Ok(_) => Status::Success,
        Err(ref e) => {
            tracing::error!("Kibana alert {} failed: {}", operation, e);
            Status::Failure
        }
    };

    record_operation(operation, status);
    result
}

/// Create the alert described by `d` and record the id Kibana assigned
#[tracing::instrument(skip_all)]
pub async fn create(d: &mut ResourceData, ctx: &ProviderContext) -> Result<()> {
    let _timer = operation_timer(Operation::Create);
    observe(Operation::Create, create_alert(d, ctx).await)
}

async fn create_alert(d: &mut ResourceData, ctx: &ProviderContext) -> Result<()> {
    kibana_alert_schema().apply_defaults(d.attributes_mut());

    let client = ctx.client();
    ensure_supported(client).await?;

    let config = AlertConfig::from_resource(d)?;
    let space_id = config.space_id.clone();
    let alert = config.into_alert()?;

    let created = api::post_alert(client, d.id(), space_id.as_deref(), &alert).await?;

    match created.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            tracing::info!("Created Kibana alert '{}' with id {}", alert.name, id);
            d.set_id(id);
        }
        None => tracing::warn!("Kibana returned no id for alert '{}'", alert.name),
    }

    flatten_alert(&created.alert?, d)
}

/// Refresh `d` from Kibana, clearing the id when the alert is gone
#[tracing::instrument(skip_all, fields(id = %d.id()))]
pub async fn read(d: &mut ResourceData, ctx: &ProviderContext) -> Result<()> {
    let _timer = operation_timer(Operation::Read);
    observe(Operation::Read, read_alert(d, ctx).await)
}

async fn read_alert(d: &mut ResourceData, ctx: &ProviderContext) -> Result<()> {
    let client = ctx.client();
    ensure_supported(client).await?;

    let space_id: Option<String> = d.get_as("space_id")?;

    match api::get_alert(client, d.id(), space_id.as_deref()).await {
        Ok(alert) => flatten_alert(&alert, d),
        Err(e) if e.is_not_found() => {
            tracing::warn!("Kibana alert ({}) not found, removing from state", d.id());
            d.set_id("");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Changes are not pushed to Kibana yet, the stored state is kept as is
#[tracing::instrument(skip_all, fields(id = %d.id()))]
pub async fn update(d: &mut ResourceData, ctx: &ProviderContext) -> Result<()> {
    let _timer = operation_timer(Operation::Update);
    observe(Operation::Update, update_alert(d, ctx).await)
}

async fn update_alert(d: &mut ResourceData, ctx: &ProviderContext) -> Result<()> {
    let space_id: Option<String> = d.get_as("space_id")?;
    api::put_alert(ctx.client(), d.id(), space_id.as_deref()).await
}

/// Delete the alert and clear the id
#[tracing::instrument(skip_all, fields(id = %d.id()))]
pub async fn delete(d: &mut ResourceData, ctx: &ProviderContext) -> Result<()> {
    let _timer = operation_timer(Operation::Delete);
    observe(Operation::Delete, delete_alert(d, ctx).await)
}

async fn delete_alert(d: &mut ResourceData, ctx: &ProviderContext) -> Result<()> {
    let client = ctx.client();
    ensure_supported(client).await?;

    let space_id: Option<String> = d.get_as("space_id")?;
    api::delete_alert(client, d.id(), space_id.as_deref()).await?;

    d.set_id("");
    Ok(())
}

/// Adopt an existing alert by id
#[tracing::instrument(skip(ctx))]
pub async fn import(id: &str, ctx: &ProviderContext) -> Result<ResourceData> {
    let _timer = operation_timer(Operation::Import);
    observe(Operation::Import, import_alert(id, ctx).await)
}

async fn import_alert(id: &str, ctx: &ProviderContext) -> Result<ResourceData> {
    let mut d = ResourceData::from_id(id);
    read_alert(&mut d, ctx).await?;

    if d.is_absent() {
        return Err(ProviderError::NotFound(format!("Kibana alert {id}")));
    }

    Ok(d)
}
