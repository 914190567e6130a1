use std::collections::HashMap;

use super::model::{
    IrradianceKind, JoinedRow, JoinedTable, MeasurementRecord, MeasurementTable, SourceTables,
};

// ---------------------------------------------------------------------------
// Per-table key index
// ---------------------------------------------------------------------------

/// First record per cell identifier of one source table.
struct KeyIndex<'a> {
    by_id: HashMap<i64, &'a MeasurementRecord>,
    /// Records in file order, duplicates removed.
    ordered: Vec<&'a MeasurementRecord>,
}

impl<'a> KeyIndex<'a> {
    fn build(table: &'a MeasurementTable) -> Self {
        let mut by_id = HashMap::with_capacity(table.len());
        let mut ordered = Vec::with_capacity(table.len());
        for rec in &table.records {
            if !by_id.contains_key(&rec.cell_id) {
                by_id.insert(rec.cell_id, rec);
                ordered.push(rec);
            }
        }

        let duplicates = table.len() - ordered.len();
        if duplicates > 0 {
            log::warn!(
                "{} table: {duplicates} duplicate {} row(s) ignored, first occurrence kept",
                table.kind,
                super::model::ID_COLUMN
            );
        }
        KeyIndex { by_id, ordered }
    }
}

// ---------------------------------------------------------------------------
// Inner join
// ---------------------------------------------------------------------------

/// A row of an intermediate join: the records matched so far, in join order.
type Partial<'a> = (i64, Vec<&'a MeasurementRecord>);

/// Inner join of `left` with `right` on cell identifier. Keeps `left` order.
fn inner_join<'a>(
    left: Vec<Partial<'a>>,
    right: &KeyIndex<'a>,
    kind: IrradianceKind,
) -> Vec<Partial<'a>> {
    let before = left.len();
    let joined: Vec<Partial<'a>> = left
        .into_iter()
        .filter_map(|(id, mut matched)| {
            let rec = right.by_id.get(&id)?;
            matched.push(*rec);
            Some((id, matched))
        })
        .collect();
    log::debug!(
        "join with {kind}: {} of {before} key(s) dropped",
        before - joined.len()
    );
    joined
}

/// Join the four source tables: direct ⋈ global, then ⋈ tilted, then ⋈ diffuse.
///
/// Only identifiers present in all four tables survive, in the direct table's
/// file order. Within a table the first row for an identifier wins.
/// Canonical coordinates are the tilted table's; rows where another source
/// disagrees are kept but logged.
pub fn join_tables(sources: &SourceTables) -> JoinedTable {
    let [direct, global, tilted, diffuse] =
        IrradianceKind::ALL.map(|kind| KeyIndex::build(sources.get(kind)));

    let driving: Vec<Partial> = direct
        .ordered
        .iter()
        .map(|rec| (rec.cell_id, vec![*rec]))
        .collect();

    let joined = inner_join(driving, &global, IrradianceKind::Global);
    let joined = inner_join(joined, &tilted, IrradianceKind::Tilted);
    let joined = inner_join(joined, &diffuse, IrradianceKind::Diffuse);

    let rows: Vec<JoinedRow> = joined
        .into_iter()
        .filter_map(|(id, matched)| {
            let sources: [MeasurementRecord; 4] = matched
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
                .try_into()
                .ok()?;
            Some(JoinedRow::new(id, sources))
        })
        .collect();

    let conflicts = rows.iter().filter(|r| !r.coordinates_agree()).count();
    if conflicts > 0 {
        log::warn!(
            "{conflicts} joined cell(s) have LAT/LON differing between sources; using {} coordinates",
            IrradianceKind::Tilted
        );
    }

    log::info!("Joined table has {} row(s)", rows.len());
    log::debug!("Joined columns: {}", JoinedTable::column_names().join(", "));
    JoinedTable::from_rows(rows)
}
