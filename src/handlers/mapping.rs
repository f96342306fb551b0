use std::collections::HashMap;

use crate::models::{Order, UpdatedOrder};
use crate::store::{AttributeValue, Record, UpdateOutput};

// ============================================================================
// Entity Mapping - Tagged store records <-> plain orders
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Missing attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("Attribute {0} is not a string value")]
    NotAString(&'static str),

    #[error("Update result carries no Attributes")]
    MissingAttributes,
}

fn string_attr(record: &Record, name: &'static str) -> Result<String, MappingError> {
    record
        .get(name)
        .ok_or(MappingError::MissingAttribute(name))?
        .as_s()
        .map(str::to_string)
        .ok_or(MappingError::NotAString(name))
}

pub fn map_item(item: &Record) -> Result<Order, MappingError> {
    Ok(Order {
        id: string_attr(item, "id")?,
        name: string_attr(item, "name")?,
        created_utc: string_attr(item, "createdUtc")?,
    })
}

pub fn map_data(data: &UpdateOutput) -> Result<UpdatedOrder, MappingError> {
    let attributes = data
        .attributes
        .as_ref()
        .ok_or(MappingError::MissingAttributes)?;

    Ok(UpdatedOrder {
        id: string_attr(attributes, "id")?,
        name: string_attr(attributes, "name")?,
    })
}

pub fn order_record(order: &Order) -> Record {
    HashMap::from([
        ("id".to_string(), AttributeValue::s(&order.id)),
        ("name".to_string(), AttributeValue::s(&order.name)),
        ("createdUtc".to_string(), AttributeValue::s(&order.created_utc)),
    ])
}
