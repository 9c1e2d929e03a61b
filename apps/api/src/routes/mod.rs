pub mod health;


use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{
    applications, chat, companies, identities, interviews, jobs, matching, profiles, saved_jobs,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Identities
        .route(
            "/api/v1/identities",
            get(identities::handlers::handle_list_identities)
                .post(identities::handlers::handle_create_identity),
        )
        .route(
            "/api/v1/identities/me",
            get(identities::handlers::handle_get_me),
        )
        .route(
            "/api/v1/identities/:id",
            get(identities::handlers::handle_get_identity)
                .patch(identities::handlers::handle_update_identity)
                .delete(identities::handlers::handle_delete_identity),
        )
        // Companies
        .route(
            "/api/v1/companies",
            get(companies::handlers::handle_list_companies)
                .post(companies::handlers::handle_create_company),
        )
        .route(
            "/api/v1/companies/:id",
            get(companies::handlers::handle_get_company)
                .patch(companies::handlers::handle_update_company)
                .delete(companies::handlers::handle_delete_company),
        )
        // Job postings
        .route(
            "/api/v1/jobs",
            get(jobs::handlers::handle_list_postings).post(jobs::handlers::handle_create_posting),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handlers::handle_get_posting)
                .patch(jobs::handlers::handle_update_posting)
                .delete(jobs::handlers::handle_delete_posting),
        )
        .route(
            "/api/v1/jobs/:id/match",
            get(matching::handlers::handle_match_posting),
        )
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handlers::handle_list_applications)
                .post(applications::handlers::handle_create_application),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handlers::handle_get_application)
                .patch(applications::handlers::handle_update_application)
                .delete(applications::handlers::handle_delete_application),
        )
        // Interviews
        .route(
            "/api/v1/interviews",
            get(interviews::handlers::handle_list_interviews)
                .post(interviews::handlers::handle_create_interview),
        )
        .route(
            "/api/v1/interviews/:id",
            get(interviews::handlers::handle_get_interview)
                .patch(interviews::handlers::handle_update_interview)
                .delete(interviews::handlers::handle_delete_interview),
        )
        // Saved jobs
        .route(
            "/api/v1/saved-jobs",
            get(saved_jobs::handlers::handle_list_saved_jobs)
                .post(saved_jobs::handlers::handle_save_job),
        )
        .route(
            "/api/v1/saved-jobs/:id",
            get(saved_jobs::handlers::handle_get_saved_job)
                .delete(saved_jobs::handlers::handle_delete_saved_job),
        )
        // Talent profiles
        .route(
            "/api/v1/profiles",
            get(profiles::handlers::handle_list_profiles)
                .post(profiles::handlers::handle_create_profile),
        )
        .route(
            "/api/v1/profiles/me",
            get(profiles::handlers::handle_get_my_profile),
        )
        .route(
            "/api/v1/profiles/:id",
            get(profiles::handlers::handle_get_profile)
                .patch(profiles::handlers::handle_update_profile)
                .delete(profiles::handlers::handle_delete_profile),
        )
        // Assistant
        .route("/api/v1/chat", post(chat::handlers::handle_chat))
        .with_state(state)
}
