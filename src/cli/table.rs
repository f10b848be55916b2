use serde_json::Value;

use crate::{cli::display::short_id, core::models::WishlistItem};

pub fn print_item_table(items: &[WishlistItem]) {
    println!("ID        NAME                  DETAILS");
    println!("------------------------------------------------------");
    for item in items {
        let id = item
            .id
            .as_deref()
            .map_or_else(|| "pending".to_owned(), short_id);
        let name = truncate(&item.name, 20);
        println!("{id:<8}  {name:<20}  {}", details_summary(item));
    }
}

pub fn details_summary(item: &WishlistItem) -> String {
    item.details
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_owned();
    }
    value.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
}
