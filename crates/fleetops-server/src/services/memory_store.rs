use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use fleetops_core::{
    AssignmentStatus, Booking, BookingPatch, BookingStatus, CrewTask, CrewTaskUpdate,
    NewCrewTask, TaskId, TaskStatus,
};
use uuid::Uuid;

use crate::db::SchedulingStore;
use crate::error::AppError;

#[derive(Default)]
struct State {
    bookings: HashMap<Uuid, Booking>,
    tasks: Vec<CrewTask>,
    booking_writes: usize,
    task_writes: usize,
    fail_booking_updates: bool,
    fail_sibling_updates: bool,
}

/// Store backed by plain collections, with switchable failures
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

fn injected() -> AppError {
    AppError::Internal("injected failure".into())
}

fn task_uuid(task: &CrewTask) -> Option<Uuid> {
    match task.id {
        TaskId::Task(id) => Some(id),
        TaskId::Booking(_) => None,
    }
}

impl InMemoryStore {
    pub fn put_booking(&self, booking: Booking) {
        self.state.lock().unwrap().bookings.insert(booking.id, booking);
    }

    pub fn put_task(&self, task: CrewTask) -> Uuid {
        let id = task_uuid(&task).unwrap();
        self.state.lock().unwrap().tasks.push(task);
        id
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.state.lock().unwrap().bookings.get(&id).cloned()
    }

    pub fn task(&self, id: Uuid) -> Option<CrewTask> {
        let state = self.state.lock().unwrap();
        state
            .tasks
            .iter()
            .find(|t| task_uuid(t) == Some(id))
            .cloned()
    }

    pub fn tasks_for(&self, booking_id: Uuid) -> Vec<CrewTask> {
        let state = self.state.lock().unwrap();
        state
            .tasks
            .iter()
            .filter(|t| t.booking_id == Some(booking_id))
            .cloned()
            .collect()
    }

    pub fn booking_writes(&self) -> usize {
        self.state.lock().unwrap().booking_writes
    }

    pub fn task_writes(&self) -> usize {
        self.state.lock().unwrap().task_writes
    }

    pub fn fail_booking_updates(&self) {
        self.state.lock().unwrap().fail_booking_updates = true;
    }

    pub fn fail_sibling_updates(&self) {
        self.state.lock().unwrap().fail_sibling_updates = true;
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        Ok(self.booking(id))
    }

    async fn update_booking_fields(
        &self,
        id: Uuid,
        patch: &BookingPatch,
    ) -> Result<Option<Booking>, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_booking_updates {
            return Err(injected());
        }
        let Some(booking) = state.bookings.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(booking);
        booking.updated_at = Utc::now();
        let updated = booking.clone();
        state.booking_writes += 1;
        Ok(Some(updated))
    }

    async fn set_assignment_status(
        &self,
        booking_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(booking) = state.bookings.get_mut(&booking_id) {
            booking.assignment_status = status;
            state.booking_writes += 1;
        }
        Ok(())
    }

    async fn schedulable_bookings(&self) -> Result<Vec<Booking>, AppError> {
        let state = self.state.lock().unwrap();
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.is_schedulable())
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.date, b.time));
        Ok(bookings)
    }

    async fn task_ids_for_booking(&self, booking_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(self
            .tasks_for(booking_id)
            .iter()
            .filter_map(task_uuid)
            .collect())
    }

    async fn insert_crew_task(&self, task: &NewCrewTask) -> Result<CrewTask, AppError> {
        let created = CrewTask {
            id: TaskId::Task(Uuid::new_v4()),
            task_number: task.task_number,
            task_type: task.task_type.clone(),
            task_status: task.task_status,
            driver_id: task.driver_id,
            driver_name: None,
            start_date: task.start_date,
            end_date: task.end_date,
            start_time: task.start_time,
            end_time: task.end_time,
            hours_per_day: task.hours_per_day,
            total_hours: task.total_hours,
            booking_id: task.booking_id,
            title: task.title.clone(),
            description: task.description.clone(),
            location: task.location.clone(),
            customer_name: task.customer_name.clone(),
            customer_phone: task.customer_phone.clone(),
            color_override: task.color_override.clone(),
            priority: task.priority,
            notes: task.notes.clone(),
            price_amount: None,
            is_booking: false,
        };
        let mut state = self.state.lock().unwrap();
        state.tasks.push(created.clone());
        state.task_writes += 1;
        Ok(created)
    }

    async fn update_crew_task(
        &self,
        id: Uuid,
        update: &CrewTaskUpdate,
    ) -> Result<Option<CrewTask>, AppError> {
        let mut state = self.state.lock().unwrap();
        let Some(task) = state.tasks.iter_mut().find(|t| task_uuid(t) == Some(id)) else {
            return Ok(None);
        };
        update.apply_to(task);
        let updated = task.clone();
        state.task_writes += 1;
        Ok(Some(updated))
    }

    async fn reassign_sibling_tasks(
        &self,
        booking_id: Uuid,
        except_task: Uuid,
        driver_id: Option<Uuid>,
    ) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sibling_updates {
            return Err(injected());
        }
        let mut updated = 0;
        for task in state.tasks.iter_mut() {
            if task.booking_id == Some(booking_id) && task_uuid(task) != Some(except_task) {
                task.driver_id = driver_id;
                updated += 1;
            }
        }
        state.task_writes += 1;
        Ok(updated)
    }

    async fn delete_tasks_for_booking(&self, booking_id: Uuid) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.booking_id != Some(booking_id));
        let removed = (before - state.tasks.len()) as u64;
        state.task_writes += 1;
        Ok(removed)
    }
}

/// A confirmed single-day booking with a driver
pub fn booking(date: &str) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        reference: Some("WP-2040".into()),
        quotation_id: None,
        driver_id: Some(Uuid::new_v4()),
        vehicle_id: None,
        date: date.parse().unwrap(),
        time: NaiveTime::from_hms_opt(8, 15, 0),
        service_name: Some("Airport Transfer".into()),
        service_type: Some("airport".into()),
        pickup_location: Some("Haneda T3".into()),
        dropoff_location: Some("Shinjuku".into()),
        customer_name: Some("Kenji Sato".into()),
        customer_email: None,
        customer_phone: Some("090-1111-2222".into()),
        duration_hours: Some(2.0),
        service_days: None,
        hours_per_day: None,
        price_amount: Some(30000.0),
        status: BookingStatus::Confirmed,
        assignment_status: AssignmentStatus::Unassigned,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A crew task linked to `booking`, carrying its details
pub fn task_for(booking: &Booking) -> CrewTask {
    CrewTask {
        id: TaskId::Task(Uuid::new_v4()),
        task_number: 1,
        task_type: "charter".into(),
        task_status: TaskStatus::Scheduled,
        driver_id: booking.driver_id,
        driver_name: None,
        start_date: booking.date,
        end_date: booking.date,
        start_time: booking.time,
        end_time: None,
        hours_per_day: booking.duration_hours,
        total_hours: booking.duration_hours,
        booking_id: Some(booking.id),
        title: booking.service_name.clone(),
        description: None,
        location: booking.pickup_location.clone(),
        customer_name: booking.customer_name.clone(),
        customer_phone: booking.customer_phone.clone(),
        color_override: None,
        priority: 1,
        notes: None,
        price_amount: None,
        is_booking: false,
    }
}
