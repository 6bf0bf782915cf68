//! Driver × date scheduling grid.
//!
//! The shift schedule query returns one flat row per (driver, date) carrying
//! that day's shifts and bookings. [`build_schedule_grid`] folds those rows
//! into the nested `driver → date → cell` shape a calendar view renders, with
//! per-cell booking counts, hours and revenue. [`expand_multi_day`] can run
//! first to spread multi-day bookings over the days they occupy.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use uuid::Uuid;

use crate::booking::service_day_count;
use crate::shift::DriverShift;

/// A booking as it appears inside a schedule row.
///
/// Only the fields the grid aggregates are typed; everything else the query
/// returns (customer, times, locations, ...) is passed through in `details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBooking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_days: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_day: Option<f64>,
    /// 1-based day within a multi-day booking, set by [`expand_multi_day`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_number: Option<u32>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// One row of the shift schedule query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub driver_id: Uuid,
    pub driver_name: String,
    pub shift_date: NaiveDate,
    #[serde(default)]
    pub shifts: Vec<DriverShift>,
    #[serde(default)]
    pub bookings: Vec<ScheduleBooking>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRef {
    pub id: Uuid,
    pub name: String,
}

/// Everything scheduled for one driver on one date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub shifts: Vec<DriverShift>,
    pub bookings: Vec<ScheduleBooking>,
    pub booking_count: usize,
    pub total_hours: f64,
    pub total_revenue: f64,
}

impl GridCell {
    fn absorb(&mut self, shifts: Vec<DriverShift>, bookings: Vec<ScheduleBooking>) {
        for booking in &bookings {
            self.total_hours += booking.duration_hours.unwrap_or(0.0);
            self.total_revenue += booking.price_amount.unwrap_or(0.0);
        }
        self.shifts.extend(shifts);
        self.bookings.extend(bookings);
        self.booking_count = self.bookings.len();
    }
}

/// Calendar-ready schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleGrid {
    /// Unique drivers in order of first appearance
    pub drivers: Vec<DriverRef>,
    /// Unique dates, ascending
    pub dates: Vec<NaiveDate>,
    pub grid: BTreeMap<Uuid, BTreeMap<NaiveDate, GridCell>>,
}

impl ScheduleGrid {
    pub fn cell(&self, driver_id: Uuid, date: NaiveDate) -> Option<&GridCell> {
        self.grid.get(&driver_id).and_then(|days| days.get(&date))
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

/// Fold flat schedule rows into the driver × date grid.
///
/// Rows repeating a (driver, date) pair are merged into the same cell.
pub fn build_schedule_grid(rows: impl IntoIterator<Item = ScheduleRow>) -> ScheduleGrid {
    let mut drivers = Vec::new();
    let mut seen_drivers = HashSet::new();
    let mut dates = BTreeSet::new();
    let mut grid: BTreeMap<Uuid, BTreeMap<NaiveDate, GridCell>> = BTreeMap::new();

    for row in rows {
        if seen_drivers.insert(row.driver_id) {
            drivers.push(DriverRef {
                id: row.driver_id,
                name: row.driver_name,
            });
        }
        dates.insert(row.shift_date);

        grid.entry(row.driver_id)
            .or_default()
            .entry(row.shift_date)
            .or_default()
            .absorb(row.shifts, row.bookings);
    }

    ScheduleGrid {
        drivers,
        dates: dates.into_iter().collect(),
        grid,
    }
}

/// Spread multi-day bookings across the consecutive days they cover.
///
/// A booking with `service_days > 1` found on a row's date is copied onto that
/// date and the following days, each copy carrying the per-day hours and an
/// equal share of the price. Single-day bookings are normalised in place.
/// Out-of-range `service_days` are clamped as for [`crate::Booking`].
/// Missing (driver, date) rows are created with no shifts.
pub fn expand_multi_day(rows: Vec<ScheduleRow>) -> Vec<ScheduleRow> {
    let mut out: Vec<ScheduleRow> = Vec::with_capacity(rows.len());
    let mut index: HashMap<(Uuid, NaiveDate), usize> = HashMap::new();

    for row in rows {
        let ScheduleRow {
            driver_id,
            driver_name,
            shift_date,
            shifts,
            bookings,
        } = row;

        let slot = slot_for(&mut out, &mut index, driver_id, &driver_name, shift_date);
        out[slot].shifts.extend(shifts);

        for booking in bookings {
            let days = service_day_count(booking.service_days);
            let hours = booking
                .hours_per_day
                .filter(|h| *h > 0.0)
                .or(booking.duration_hours)
                .unwrap_or(0.0);

            if days == 1 {
                let mut single = booking;
                single.duration_hours = Some(hours);
                single.hours_per_day = Some(hours);
                single.service_days = Some(1);
                single.day_number = Some(1);
                out[slot].bookings.push(single);
                continue;
            }

            let daily_price = booking.price_amount.map(|p| p / days as f64);
            for day in 0..days {
                let Some(date) = shift_date.checked_add_days(Days::new(u64::from(day))) else {
                    break;
                };
                let mut copy = booking.clone();
                copy.duration_hours = Some(hours);
                copy.hours_per_day = Some(hours);
                copy.price_amount = daily_price;
                copy.service_days = i32::try_from(days).ok();
                copy.day_number = Some(day + 1);

                let day_slot = slot_for(&mut out, &mut index, driver_id, &driver_name, date);
                out[day_slot].bookings.push(copy);
            }
        }
    }

    out
}

fn slot_for(
    out: &mut Vec<ScheduleRow>,
    index: &mut HashMap<(Uuid, NaiveDate), usize>,
    driver_id: Uuid,
    driver_name: &str,
    date: NaiveDate,
) -> usize {
    *index.entry((driver_id, date)).or_insert_with(|| {
        out.push(ScheduleRow {
            driver_id,
            driver_name: driver_name.to_string(),
            shift_date: date,
            shifts: Vec::new(),
            bookings: Vec::new(),
        });
        out.len() - 1
    })
}
