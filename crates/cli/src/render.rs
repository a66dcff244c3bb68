//! Plain-text views of the inventory.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use wastetrack_inventory::{COLLECTION_LOCATION, MattressRecord, MattressSize};
use wastetrack_registration::Cluster;

pub fn size_table() -> String {
    let mut out = format!("{:<22} {:<12} {}\n", "SIZE", "CM", "KG");
    for size in MattressSize::ALL {
        let r = size.reference();
        let _ = writeln!(out, "{:<22} {:<12} {}", size, r.dimensions(), r.weight_range());
    }
    out
}

pub fn inventory(records: &[MattressRecord]) -> String {
    if records.is_empty() {
        return "No mattresses registered yet\n".to_string();
    }

    let mut out = String::new();
    for r in records {
        let _ = writeln!(
            out,
            "{:<18} {:<12} {:<22} {:<18} {:<18} {}",
            r.id_typed(),
            r.status(),
            r.mattress_size(),
            r.condition_assessment(),
            r.material_composition(),
            r.collection_date(),
        );
    }
    out
}

pub fn record_detail(record: &MattressRecord, cluster: Cluster) -> String {
    let size = record.mattress_size().reference();
    let created = DateTime::<Utc>::from_timestamp_millis(record.created_at())
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| record.created_at().to_string());

    let mut out = String::new();
    let _ = writeln!(out, "id:         {}", record.id_typed());
    let _ = writeln!(out, "status:     {}", record.status());
    let _ = writeln!(
        out,
        "size:       {} ({} cm, {} kg)",
        record.mattress_size(),
        size.dimensions(),
        size.weight_range()
    );
    let _ = writeln!(out, "material:   {}", record.material_composition());
    let _ = writeln!(out, "condition:  {}", record.condition_assessment());
    let _ = writeln!(out, "collected:  {} at {}", record.collection_date(), COLLECTION_LOCATION);
    let _ = writeln!(out, "created:    {created}");
    let _ = writeln!(out, "asset:      {}", record.external_asset_reference());
    let _ = writeln!(
        out,
        "explorer:   {}",
        cluster.explorer_url(record.external_asset_reference())
    );
    out
}
