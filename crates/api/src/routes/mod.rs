//! Route definitions, one module per resource.

pub mod auth;
pub mod concert;
pub mod health;
pub mod scan;
pub mod ticket;
pub mod transfer;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /concerts                                        list, create
/// /concerts/{id}                                   get, update, delete
///
/// /tickets/create/{concert_id}                     issue one ticket (admin)
/// /tickets/batch/create/{concert_id}               issue 1..=5000 tickets (admin)
/// /tickets/{id}                                    get, delete
/// /tickets/{id}/qr-code                            stored QR blob
/// /tickets/{id}/download-qr                        QR image download
/// /tickets/{id}/mark-sold                          created -> sold (admin)
/// /tickets/number/{ticket_number}                  lookup by scanned number
/// /tickets/concert/{concert_id}                    list a concert's tickets
/// /tickets/concert/{concert_id}/qr-codes/download  ZIP of QR images
///
/// /scans                                           record scan (scanner/admin)
/// /scans/ticket/{ticket_id}                        scan history
/// /scans/concert/{concert_id}/attendance           attendance statistics
///
/// /transfers/initiate                              create pending transfer
/// /transfers/pending                               pending transfers for caller
/// /transfers/{id}                                  get
/// /transfers/{id}/accept                           accept (recipient only)
/// /transfers/{id}/reject                           reject (recipient only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/concerts", concert::router())
        .nest("/tickets", ticket::router())
        .nest("/scans", scan::router())
        .nest("/transfers", transfer::router())
}
