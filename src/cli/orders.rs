//! `konvoi orders` / `konvoi show` — the dispatcher's worklist.

use anyhow::{Result, bail};

use crate::format::OutputFormat;
use crate::model::types::OrderId;
use crate::store::OrderStore;

/// List orders available to merge.
pub fn list(store: &dyn OrderStore, format: OutputFormat) -> Result<()> {
    let orders = store.list_new().map_err(|e| anyhow::anyhow!("{e}"))?;

    if format == OutputFormat::Json {
        println!("{}", format.serialize(&orders)?);
        return Ok(());
    }

    if orders.is_empty() {
        println!("No orders with status 'new'.");
        return Ok(());
    }

    println!("{:<12} {:<16} {:<30} {}", "ID", "NUMBER", "ROUTE", "CLIENT");
    for order in &orders {
        println!(
            "{:<12} {:<16} {:<30} {}",
            order.id,
            order.order_number,
            order.route_summary(),
            order.client_name
        );
    }
    println!();
    println!("Next: konvoi preview --draft <file>");
    Ok(())
}

/// Show a single order with full fields.
pub fn show(store: &dyn OrderStore, order_id: &str, format: OutputFormat) -> Result<()> {
    let id = parse_order_id(order_id)?;
    let order = store.get(&id).map_err(|e| anyhow::anyhow!("{e}"))?;

    if format == OutputFormat::Json {
        println!("{}", format.serialize(&order)?);
        return Ok(());
    }

    println!("Order {}", order.id);
    println!("  Number:    {}", order.order_number);
    println!("  Route:     {}", order.route_summary());
    println!("  Pickup:    {}", order.location);
    println!("  Delivery:  {}", order.delivery);
    println!("  MPK:       {}", order.mpk);
    println!("  Client:    {}", order.client_name);
    println!("  Requester: {}", order.responsible_person);
    println!("  Status:    {}", order.status);
    if let Some(km) = order.distance_km {
        println!("  Distance:  {km} km");
    }
    if let Some(response) = &order.response {
        println!(
            "  Response:  {} / {} / {} PLN",
            response.driver, response.vehicle, response.price
        );
    }
    if let Some(record) = &order.merge_record {
        println!(
            "  Merge:     {} donor(s), merged by {}",
            record.original_transports.len(),
            record.merged_by
        );
        println!("  Next: konvoi unmerge {}", order.id);
    }
    Ok(())
}

/// Parse and validate an order id from the command line.
pub(crate) fn parse_order_id(raw: &str) -> Result<OrderId> {
    match raw.parse::<OrderId>() {
        Ok(id) => Ok(id),
        Err(e) => bail!("{e}\n  Example: TR-1001"),
    }
}
