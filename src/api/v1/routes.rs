/*
 * Responsibility
 * - v1 URL structure
 * - Everything here sits behind the bearer-auth middleware (applied in app.rs);
 *   per-route authorization is expressed by the extractor each handler takes
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    payroll::{
        calculate, create_record, get_record, list_records, my_records, process_period, summary,
        update_record,
    },
    time_entries::{
        clock_in, clock_out, delete_entry, get_entry, list_entries, my_entries, my_summary,
        update_entry,
    },
    users::{
        create_my_employee, delete_user, get_me, get_my_employee, get_user, list_users, update_me,
        update_user,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        // users
        .route("/users/me", get(get_me).put(update_me))
        .route(
            "/users/me/employee",
            get(get_my_employee).post(create_my_employee),
        )
        .route("/users", get(list_users))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        // payroll
        .route("/payroll/records", get(list_records).post(create_record))
        .route("/payroll/records/me", get(my_records))
        .route(
            "/payroll/records/{record_id}",
            get(get_record).put(update_record),
        )
        .route("/payroll/calculate", post(calculate))
        .route("/payroll/process-period", post(process_period))
        .route("/payroll/summary", get(summary))
        // time tracking
        .route("/time/entries", get(list_entries).post(clock_in))
        .route("/time/entries/me", get(my_entries))
        .route(
            "/time/entries/{entry_id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/time/entries/{entry_id}/clock-out", put(clock_out))
        .route("/time/summary/me", get(my_summary))
}
