//! End to end: the terminal calendar talking to a running server

mod test_utils;

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use practice_calendar::appointments::{SlotKey, Status};
    use practice_calendar::calendar::{CalendarSession, Persistence};
    use practice_calendar::client::AppointmentsClient;

    use crate::test_utils::{failing_app, test_app};

    /// Serve the router on an ephemeral port and return its base URL.
    async fn spawn(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
    }

    #[tokio::test]
    async fn it_saves_a_booking_through_the_api() {
        let url = spawn(test_app()).await;
        let client = AppointmentsClient::new(&url).unwrap();

        let mut session = CalendarSession::open(today(), &client).await;
        assert!(session.appointments().is_empty());

        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let key = session.slot(0, nine).unwrap();
        session.begin_add(key.clone()).unwrap();
        {
            let draft = session.editor_mut().draft_mut().unwrap();
            draft.first_name = String::from("Jean");
            draft.last_name = String::from("Dupont");
            draft.status = Status::Absent;
        }
        session.submit().unwrap();
        assert!(session.flush(&client).await.unwrap());
        assert!(!session.flush(&client).await.unwrap());

        let reopened = CalendarSession::open(today(), &client).await;
        let appt = &reopened.appointments()[&SlotKey::from("2025-01-06_09:00")];
        assert_eq!(appt.display_name(), "Jean Dupont");
        assert_eq!(appt.status, Status::Absent);
        assert_eq!(client.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn it_keeps_local_changes_when_the_store_is_down() {
        let url = spawn(failing_app()).await;
        let client = AppointmentsClient::new(&url).unwrap();

        let mut session = CalendarSession::open(today(), &client).await;
        assert!(session.appointments().is_empty());

        let key = SlotKey::from("2025-01-10_18:30");
        session.begin_add(key.clone()).unwrap();
        {
            let draft = session.editor_mut().draft_mut().unwrap();
            draft.first_name = String::from("Eva");
            draft.last_name = String::from("Moreau");
        }
        session.submit().unwrap();

        assert!(session.flush(&client).await.is_err());
        assert!(session.is_dirty());
        assert!(session.appointments().contains_key(&key));
    }
}
