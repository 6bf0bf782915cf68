use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::crew_task::CrewTask;

/// Grouping key used for tasks without a driver
pub const UNASSIGNED_KEY: &str = "unassigned";

/// One day of a (possibly multi-day) crew task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarTask {
    #[serde(flatten)]
    pub task: CrewTask,
    /// 1-based day within the task
    pub current_day: u32,
    pub task_date: NaiveDate,
    pub is_multi_day: bool,
    pub is_first_day: bool,
    pub is_last_day: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub tasks: Vec<CalendarTask>,
    pub task_count: usize,
}

/// A driver's row in the task calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSchedule {
    pub driver_id: Option<Uuid>,
    pub driver_name: String,
    pub dates: BTreeMap<NaiveDate, DaySchedule>,
}

/// Expand tasks into one entry per day, keeping only days inside `[start, end]`
pub fn expand_tasks(tasks: &[CrewTask], start: NaiveDate, end: NaiveDate) -> Vec<CalendarTask> {
    let mut expanded = Vec::new();

    for task in tasks {
        let total_days = task.span_days();
        for offset in 0..total_days {
            let Some(day) = task.start_date.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            if day < start {
                continue;
            }
            if day > end {
                break;
            }
            expanded.push(CalendarTask {
                task: task.clone(),
                current_day: offset + 1,
                task_date: day,
                is_multi_day: total_days > 1,
                is_first_day: offset == 0,
                is_last_day: offset + 1 == total_days,
            });
        }
    }

    expanded
}

/// Group expanded tasks by driver, then by date.
///
/// Drivers keep the order in which they first appear; tasks without a driver
/// share a single "Unassigned" row.
pub fn group_by_driver(tasks: Vec<CalendarTask>) -> Vec<DriverSchedule> {
    let mut schedules: Vec<DriverSchedule> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for task in tasks {
        let key = task
            .task
            .driver_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| UNASSIGNED_KEY.to_string());

        let slot = *index.entry(key).or_insert_with(|| {
            schedules.push(DriverSchedule {
                driver_id: task.task.driver_id,
                driver_name: match task.task.driver_id {
                    Some(_) => task
                        .task
                        .driver_name
                        .clone()
                        .unwrap_or_else(|| "Unknown driver".to_string()),
                    None => "Unassigned".to_string(),
                },
                dates: BTreeMap::new(),
            });
            schedules.len() - 1
        });

        let day = schedules[slot].dates.entry(task.task_date).or_default();
        day.tasks.push(task);
        day.task_count = day.tasks.len();
    }

    schedules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew_task::fixtures::task;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_day_task() {
        let tasks = vec![task("2024-08-02", "2024-08-02", None)];
        let expanded = expand_tasks(&tasks, date("2024-08-01"), date("2024-08-31"));
        assert_eq!(expanded.len(), 1);
        let day = &expanded[0];
        assert!(!day.is_multi_day);
        assert!(day.is_first_day && day.is_last_day);
        assert_eq!(day.current_day, 1);
    }

    #[test]
    fn test_multi_day_task_clipped_to_range() {
        let tasks = vec![task("2024-07-30", "2024-08-03", None)];
        let expanded = expand_tasks(&tasks, date("2024-08-01"), date("2024-08-02"));

        let dates: Vec<NaiveDate> = expanded.iter().map(|t| t.task_date).collect();
        assert_eq!(dates, vec![date("2024-08-01"), date("2024-08-02")]);
        assert_eq!(expanded[0].current_day, 3);
        assert!(expanded.iter().all(|t| t.is_multi_day));
        assert!(expanded.iter().all(|t| !t.is_first_day && !t.is_last_day));
    }

    #[test]
    fn test_inverted_task_range_yields_nothing() {
        let tasks = vec![task("2024-08-05", "2024-08-01", None)];
        assert!(expand_tasks(&tasks, date("2024-08-01"), date("2024-08-31")).is_empty());
    }

    #[test]
    fn test_group_by_driver_and_date() {
        let driver = Uuid::new_v4();
        let tasks = vec![
            task("2024-08-01", "2024-08-02", Some(driver)),
            task("2024-08-01", "2024-08-01", None),
            task("2024-08-01", "2024-08-01", Some(driver)),
        ];
        let expanded = expand_tasks(&tasks, date("2024-08-01"), date("2024-08-31"));
        let schedules = group_by_driver(expanded);

        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[0].driver_id, Some(driver));
        assert_eq!(schedules[0].driver_name, "Alice Tanaka");
        assert_eq!(schedules[0].dates[&date("2024-08-01")].task_count, 2);
        assert_eq!(schedules[0].dates[&date("2024-08-02")].task_count, 1);

        assert_eq!(schedules[1].driver_id, None);
        assert_eq!(schedules[1].driver_name, "Unassigned");
    }

    #[test]
    fn test_calendar_task_serializes_flat() {
        let tasks = vec![task("2024-08-01", "2024-08-01", None)];
        let expanded = expand_tasks(&tasks, date("2024-08-01"), date("2024-08-01"));
        let json = serde_json::to_value(&expanded[0]).unwrap();
        assert_eq!(json["task_date"], "2024-08-01");
        assert_eq!(json["title"], "Shuttle");
        assert_eq!(json["is_first_day"], true);
    }
}
