//! Diesel adapters against embedded PostgreSQL.
//!
//! These cover the statements that only PostgreSQL can exercise: the counter
//! upsert, row locks taken by `serve` and the `SKIP LOCKED` teller scan used
//! by auto-assignment. Each test runs in its own database on a shared
//! cluster and drives concurrent callers from one multi-thread runtime.

use std::collections::HashSet;

use bqms::domain::ports::{
    AssignmentRepositoryError, AutoAssignOutcome, DailyCounterRepository, TellerRepository,
    TicketAssignmentRepository, TicketRepository, TicketRepositoryError,
};
use bqms::domain::ticket_transitions::TransitionError;
use bqms::domain::{
    LeastRecentlyAssignedSelection, Teller, Ticket, TicketId, TicketNumber, TicketType,
};
use bqms::outbound::persistence::{
    DbPool, DieselDailyCounterRepository, DieselTellerRepository,
    DieselTicketAssignmentRepository, DieselTicketRepository, PoolConfig,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{handle_cluster_setup_failure, provision_database, shared_cluster};

const RACERS: u32 = 24;

struct QueueDb {
    runtime: Runtime,
    counters: DieselDailyCounterRepository,
    tickets: DieselTicketRepository,
    tellers: DieselTellerRepository,
    assignments: DieselTicketAssignmentRepository,
    _database: TemporaryDatabase,
}

fn setup() -> Result<QueueDb, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster().map_err(|err| err.to_string())?;
    let database = provision_database(cluster)?;

    let config = PoolConfig::new(database.url().to_string())
        .with_max_size(8)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(QueueDb {
        runtime,
        counters: DieselDailyCounterRepository::new(pool.clone()),
        tickets: DieselTicketRepository::new(pool.clone()),
        tellers: DieselTellerRepository::new(pool.clone()),
        assignments: DieselTicketAssignmentRepository::new(pool),
        _database: database,
    })
}

#[fixture]
fn queue_db() -> Option<QueueDb> {
    match setup() {
        Ok(db) => Some(db),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 11, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 11).expect("valid date")
}

impl QueueDb {
    fn seed_tellers(&self, names: &[&str]) -> Vec<Teller> {
        let names: Vec<String> = names.iter().map(|name| (*name).to_owned()).collect();
        self.runtime.block_on(async {
            self.tellers
                .seed_if_empty(&names)
                .await
                .expect("seed tellers");
            self.tellers.list(false).await.expect("list tellers")
        })
    }

    fn issue(&self, ticket_type: TicketType, sequence: u32) -> Ticket {
        let ticket = Ticket::issue(
            TicketId::random(),
            TicketNumber::issue(day(), ticket_type, sequence),
            ticket_type,
            opening_time(),
        );
        self.runtime
            .block_on(self.tickets.insert(&ticket))
            .expect("insert ticket");
        ticket
    }

    fn teller(&self, teller: &Teller) -> Teller {
        self.runtime
            .block_on(self.tellers.find_by_id(&teller.id))
            .expect("teller lookup")
            .expect("teller exists")
    }
}

#[rstest]
fn concurrent_counter_calls_share_no_sequence(queue_db: Option<QueueDb>) {
    let Some(db) = queue_db else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_counter_calls_share_no_sequence skipped");
        return;
    };

    let sequences: Vec<u32> = db.runtime.block_on(async {
        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let counters = db.counters.clone();
                tokio::spawn(async move { counters.next_sequence(day()).await })
            })
            .collect();
        let mut sequences = Vec::new();
        for handle in handles {
            sequences.push(handle.await.expect("task").expect("next sequence"));
        }
        sequences
    });

    let distinct: HashSet<u32> = sequences.iter().copied().collect();
    let expected: HashSet<u32> = (1..=RACERS).collect();
    assert_eq!(distinct, expected);

    let next_day = NaiveDate::from_ymd_opt(2025, 4, 12).expect("valid date");
    let fresh = db
        .runtime
        .block_on(db.counters.next_sequence(next_day))
        .expect("next day sequence");
    assert_eq!(fresh, 1);
}

#[rstest]
fn racing_serves_on_one_teller_have_one_winner(queue_db: Option<QueueDb>) {
    let Some(db) = queue_db else {
        eprintln!("SKIP-TEST-CLUSTER: racing_serves_on_one_teller_have_one_winner skipped");
        return;
    };
    let tellers = db.seed_tellers(&["Teller A"]);
    let teller_a = tellers.first().expect("teller A").clone();
    let first = db.issue(TicketType::Withdrawal, 1);
    let second = db.issue(TicketType::Deposit, 2);

    let results = db.runtime.block_on(async {
        let handles: Vec<_> = [first.id, second.id]
            .into_iter()
            .map(|ticket_id| {
                let assignments = db.assignments.clone();
                let teller_id = teller_a.id;
                tokio::spawn(async move {
                    assignments
                        .serve(&ticket_id, &teller_id, opening_time())
                        .await
                })
            })
            .collect();
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.expect("task"));
        }
        results
    });

    let winners = results.iter().filter(|result| result.is_ok()).count();
    let busy = results
        .iter()
        .filter(|result| {
            **result == Err(AssignmentRepositoryError::rejected(TransitionError::TellerBusy))
        })
        .count();
    assert_eq!((winners, busy), (1, 1), "unexpected outcomes: {results:?}");
    assert!(db.teller(&teller_a).is_active);

    let served: Vec<bool> = [first.id, second.id]
        .iter()
        .map(|id| {
            db.runtime
                .block_on(db.tickets.find_by_id(id))
                .expect("ticket lookup")
                .expect("ticket exists")
                .is_served
        })
        .collect();
    assert_eq!(served.iter().filter(|is_served| **is_served).count(), 1);
}

#[rstest]
fn racing_auto_assigns_take_an_idle_teller_once(queue_db: Option<QueueDb>) {
    let Some(db) = queue_db else {
        eprintln!("SKIP-TEST-CLUSTER: racing_auto_assigns_take_an_idle_teller_once skipped");
        return;
    };
    db.seed_tellers(&["Teller A"]);
    let ids: Vec<TicketId> = (1..=8)
        .map(|sequence| db.issue(TicketType::Inquiry, sequence).id)
        .collect();

    let outcomes = db.runtime.block_on(async {
        let handles: Vec<_> = ids
            .into_iter()
            .map(|ticket_id| {
                let assignments = db.assignments.clone();
                tokio::spawn(async move {
                    assignments
                        .auto_assign(&ticket_id, opening_time(), &LeastRecentlyAssignedSelection)
                        .await
                })
            })
            .collect();
        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.expect("task").expect("auto assign"));
        }
        outcomes
    });

    let assigned = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, AutoAssignOutcome::Assigned(_)))
        .count();
    let starved = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, AutoAssignOutcome::NoTellerAvailable))
        .count();
    assert_eq!((assigned, starved), (1, 7));
}

#[rstest]
fn completing_a_canceled_ticket_keeps_the_teller_on_its_next_ticket(queue_db: Option<QueueDb>) {
    let Some(db) = queue_db else {
        eprintln!("SKIP-TEST-CLUSTER: completing_a_canceled_ticket_keeps_the_teller skipped");
        return;
    };
    let tellers = db.seed_tellers(&["Teller A"]);
    let teller_a = tellers.first().expect("teller A").clone();
    let first = db.issue(TicketType::Withdrawal, 1);
    let second = db.issue(TicketType::Transfer, 2);

    let result = db.runtime.block_on(async {
        db.assignments
            .serve(&first.id, &teller_a.id, opening_time())
            .await
            .expect("serve first");
        let canceled = db
            .assignments
            .cancel(&first.ticket_number)
            .await
            .expect("cancel first");
        assert!(canceled.released_teller.is_some());
        db.assignments
            .serve(&second.id, &teller_a.id, opening_time())
            .await
            .expect("serve second");
        db.assignments.complete(&first.id).await
    });

    assert_eq!(
        result,
        Err(AssignmentRepositoryError::rejected(TransitionError::Canceled))
    );
    assert!(db.teller(&teller_a).is_active);
}

#[rstest]
fn reissued_ticket_number_is_reported_as_duplicate(queue_db: Option<QueueDb>) {
    let Some(db) = queue_db else {
        eprintln!("SKIP-TEST-CLUSTER: reissued_ticket_number_is_reported_as_duplicate skipped");
        return;
    };
    let original = db.issue(TicketType::Other, 1);
    let clash = Ticket::issue(
        TicketId::random(),
        original.ticket_number.clone(),
        TicketType::Other,
        opening_time(),
    );

    let result = db.runtime.block_on(db.tickets.insert(&clash));

    assert!(
        matches!(result, Err(TicketRepositoryError::DuplicateNumber { .. })),
        "unexpected result: {result:?}"
    );
}
