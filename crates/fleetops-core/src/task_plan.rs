use chrono::Days;

use crate::booking::Booking;
use crate::crew_task::{CrewTaskUpdate, NewCrewTask, TaskStatus};
use crate::time::{add_hours, default_start_time};

/// Lay a booking out as one crew task per service day
pub fn plan_crew_tasks(booking: &Booking) -> Vec<NewCrewTask> {
    let service_days = booking.service_day_count();
    let hours = booking.hours_per_service_day();
    let start_time = booking.time.unwrap_or_else(default_start_time);
    let end_time = add_hours(start_time, hours);
    let service_name = booking.service_name.clone().unwrap_or_default();

    (0..service_days)
        .filter_map(|offset| {
            let day = booking.date.checked_add_days(Days::new(u64::from(offset)))?;
            let title = if service_days > 1 {
                format!("{} (Day {}/{})", service_name, offset + 1, service_days)
            } else {
                service_name.clone()
            };

            Some(NewCrewTask {
                task_number: 1,
                task_type: "charter".to_string(),
                task_status: TaskStatus::Scheduled,
                driver_id: booking.driver_id,
                start_date: day,
                end_date: day,
                start_time: Some(start_time),
                end_time: Some(end_time),
                hours_per_day: Some(hours),
                total_hours: Some(hours),
                booking_id: Some(booking.id),
                title: Some(title),
                description: service_description(booking),
                location: booking.pickup_location.clone(),
                customer_name: booking.customer_name.clone(),
                customer_phone: booking.customer_phone.clone(),
                color_override: None,
                priority: 1,
                notes: booking
                    .reference
                    .as_ref()
                    .map(|r| format!("From booking {}", r)),
            })
        })
        .collect()
}

/// Update that refreshes an existing task with the booking's current details
pub fn refresh_from_booking(booking: &Booking) -> CrewTaskUpdate {
    CrewTaskUpdate {
        title: Some(booking.service_name.clone()),
        description: Some(service_description(booking)),
        location: Some(booking.pickup_location.clone()),
        customer_name: Some(booking.customer_name.clone()),
        customer_phone: Some(booking.customer_phone.clone()),
        ..Default::default()
    }
}

fn service_description(booking: &Booking) -> Option<String> {
    booking
        .service_type
        .as_ref()
        .map(|t| format!("{} service", t))
}
