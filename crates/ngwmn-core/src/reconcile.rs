use std::collections::{HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::errors::RecordError;
use crate::model::{
    CanonicalEntry, CanonicalSeries, ContinuousWaterLevel, ManualWaterLevel, Reading,
};
use crate::schema::SourceDomain;

const DEPTH_FIELD: &str = "DepthToWaterBGS";

/// Merge manual and pressure readings for one point into a single series with
/// at most one matched entry per calendar date.
///
/// Each continuous record, in input order, is paired with the first
/// not-yet-consumed manual record measured on the same day. The manual
/// reading wins only when its depth is strictly smaller; otherwise the
/// pressure reading is kept. A paired manual record is consumed either way.
/// Manual records that never paired are appended, then the whole series is
/// stable-sorted by calendar date.
pub fn reconcile(
    manual: Vec<ManualWaterLevel>,
    continuous: Vec<ContinuousWaterLevel>,
) -> Result<CanonicalSeries, RecordError> {
    let manual_dates = manual
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .measured_on()
                .ok_or_else(|| RecordError::MissingMeasurementDate {
                    domain: SourceDomain::ManualWaterLevels,
                    point_id: record.point_id.clone(),
                    index,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut by_date: HashMap<NaiveDate, VecDeque<usize>> = HashMap::new();
    for (index, date) in manual_dates.iter().enumerate() {
        by_date.entry(*date).or_default().push_back(index);
    }

    // Pass 1: decide every pairing without moving any record.
    let mut consumed = vec![false; manual.len()];
    let mut continuous_dates = Vec::with_capacity(continuous.len());
    let mut preferred_manual: Vec<Option<usize>> = Vec::with_capacity(continuous.len());

    for (index, record) in continuous.iter().enumerate() {
        let date = record
            .measured_on()
            .ok_or_else(|| RecordError::MissingMeasurementDate {
                domain: SourceDomain::ContinuousWaterLevels,
                point_id: record.point_id.clone(),
                index,
            })?;
        continuous_dates.push(date);

        let Some(manual_index) = by_date.get_mut(&date).and_then(VecDeque::pop_front) else {
            preferred_manual.push(None);
            continue;
        };
        consumed[manual_index] = true;

        let matched = &manual[manual_index];
        let manual_depth =
            matched
                .depth_to_water_bgs
                .ok_or_else(|| RecordError::MissingField {
                    domain: SourceDomain::ManualWaterLevels,
                    point_id: matched.point_id.clone(),
                    index: manual_index,
                    field: DEPTH_FIELD,
                })?;
        let pressure_depth = record
            .depth_to_water_bgs
            .ok_or_else(|| RecordError::MissingField {
                domain: SourceDomain::ContinuousWaterLevels,
                point_id: record.point_id.clone(),
                index,
                field: DEPTH_FIELD,
            })?;

        preferred_manual.push((manual_depth < pressure_depth).then_some(manual_index));
    }

    // Pass 2: move records into entries.
    let matched_count = consumed.iter().filter(|c| **c).count();
    let manual_preferred = preferred_manual.iter().flatten().count();
    let mut pool: Vec<Option<ManualWaterLevel>> = manual.into_iter().map(Some).collect();
    let mut entries = Vec::with_capacity(continuous.len() + pool.len() - matched_count);

    for ((record, measured_on), preferred) in continuous
        .into_iter()
        .zip(continuous_dates)
        .zip(preferred_manual)
    {
        let reading = match preferred.and_then(|index| pool[index].take()) {
            Some(manual_record) => Reading::Manual(manual_record),
            None => Reading::Pressure(record),
        };
        entries.push(CanonicalEntry {
            measured_on,
            reading,
        });
    }

    let series_dates: HashSet<NaiveDate> = entries.iter().map(|e| e.measured_on).collect();
    let mut leftover_dates = HashSet::new();
    let mut leftover = 0usize;

    for (index, slot) in pool.into_iter().enumerate() {
        if consumed[index] {
            continue;
        }
        let Some(record) = slot else { continue };
        let measured_on = manual_dates[index];
        if series_dates.contains(&measured_on) || !leftover_dates.insert(measured_on) {
            warn!(
                point_id = %record.point_id,
                date = %measured_on,
                manual_index = index,
                "unmatched manual reading shares its date with another series entry"
            );
        }
        leftover += 1;
        entries.push(CanonicalEntry {
            measured_on,
            reading: Reading::Manual(record),
        });
    }

    entries.sort_by_key(|entry| entry.measured_on);

    debug!(
        matched = matched_count,
        manual_preferred,
        pressure_kept = entries.len() - manual_preferred - leftover,
        leftover_manual = leftover,
        "reconciled water levels"
    );

    Ok(CanonicalSeries::from_sorted(entries))
}
