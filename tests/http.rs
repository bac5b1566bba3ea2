use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct TodayResponse {
    date: String,
    total: usize,
    completed: usize,
    remaining: usize,
}

#[derive(Debug, Deserialize)]
struct StreakInfo {
    length: u32,
}

#[derive(Debug, Deserialize)]
struct RoutineView {
    id: String,
    title: String,
    completed_today: bool,
    total_completions: usize,
    streak: Option<StreakInfo>,
}

#[derive(Debug, Deserialize)]
struct RoutinesResponse {
    selected: Option<String>,
    routines: Vec<RoutineView>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    date: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct DayCell {
    day: u32,
    status: String,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    title: String,
    year: i32,
    month: u32,
    leading_blanks: u32,
    days: Vec<DayCell>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("routine_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_routine_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_UTC_OFFSET_MINUTES", "0")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn today(client: &Client, base_url: &str) -> TodayResponse {
    client
        .get(format!("{base_url}/api/today"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create(client: &Client, base_url: &str, title: &str) -> RoutineView {
    let response = client
        .post(format!("{base_url}/api/routines"))
        .json(&serde_json::json!({ "title": title }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_toggle_updates_today_counts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server.base_url).await;
    let routine = create(&client, &server.base_url, "  Drink water ").await;
    assert_eq!(routine.title, "Drink water");
    assert!(!routine.completed_today);

    let toggled: CompletionResponse = client
        .post(format!("{}/api/routines/{}/toggle", server.base_url, routine.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(toggled.completed);

    let after = today(&client, &server.base_url).await;
    assert_eq!(after.total, before.total + 1);
    assert_eq!(after.completed, before.completed + 1);
    assert_eq!(after.remaining, before.remaining);
    assert_eq!(after.completed + after.remaining, after.total);
    assert_eq!(toggled.date, after.date);

    let list: RoutinesResponse = client
        .get(format!("{}/api/routines", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed = list.routines.iter().find(|r| r.id == routine.id).unwrap();
    assert!(listed.completed_today);
    assert_eq!(listed.streak.as_ref().map(|s| s.length), Some(1));
}

#[tokio::test]
async fn http_blank_title_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = today(&client, &server.base_url).await;
    let response = client
        .post(format!("{}/api/routines", server.base_url))
        .json(&serde_json::json!({ "title": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = today(&client, &server.base_url).await;
    assert_eq!(after.total, before.total);
}

#[tokio::test]
async fn http_unknown_routine_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let missing = "00000000-0000-4000-8000-000000000000";

    let response = client
        .delete(format!("{}/api/routines/{missing}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .patch(format!("{}/api/routines/{missing}", server.base_url))
        .json(&serde_json::json!({ "title": "Anything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_delete_moves_selection_to_first() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let older = create(&client, &server.base_url, "Stretch").await;
    let newer = create(&client, &server.base_url, "Meditate").await;

    let response = client
        .delete(format!("{}/api/routines/{}", server.base_url, newer.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let list: RoutinesResponse = client
        .get(format!("{}/api/routines", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.routines[0].id, older.id);
    assert_eq!(list.selected.as_deref(), Some(older.id.as_str()));
}

#[tokio::test]
async fn http_calendar_marks_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let routine = create(&client, &server.base_url, "Read").await;
    let completion: CompletionResponse = client
        .put(format!("{}/api/routines/{}/completion", server.base_url, routine.id))
        .json(&serde_json::json!({ "completed": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(completion.completed);

    // ask for the completion's own month so a midnight rollover cannot move the target
    let (year, month, day): (i32, u32, u32) = (
        completion.date[..4].parse().unwrap(),
        completion.date[5..7].parse().unwrap(),
        completion.date[8..].parse().unwrap(),
    );
    let calendar: CalendarResponse = client
        .get(format!(
            "{}/api/routines/{}/calendar?year={year}&month={month}",
            server.base_url, routine.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(calendar.title, "Read");
    assert_eq!((calendar.year, calendar.month), (year, month));
    assert!(calendar.leading_blanks < 7);

    let cell = calendar.days.iter().find(|cell| cell.day == day).unwrap();
    assert_eq!(cell.status, "completed");
    assert!(
        calendar
            .days
            .iter()
            .filter(|cell| cell.day < day)
            .all(|cell| cell.status == "before_created" || cell.status == "missed")
    );
}

#[tokio::test]
async fn http_bad_date_and_month_are_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let routine = create(&client, &server.base_url, "Journal").await;

    let response = client
        .put(format!("{}/api/routines/{}/completion", server.base_url, routine.id))
        .json(&serde_json::json!({ "date": "2024-2-30", "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!(
            "{}/api/routines/{}/calendar?year=2024&month=13",
            server.base_url, routine.id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_malformed_toggle_body_changes_nothing() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let routine = create(&client, &server.base_url, "Floss").await;
    let url = format!("{}/api/routines/{}/toggle", server.base_url, routine.id);

    let untyped = client
        .post(&url)
        .body(r#"{"date":"2024-03-01"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(untyped.status(), StatusCode::BAD_REQUEST);

    let wrong_type = client
        .post(&url)
        .json(&serde_json::json!({ "date": 20240301 }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);

    let list: RoutinesResponse = client
        .get(format!("{}/api/routines", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed = list.routines.iter().find(|r| r.id == routine.id).unwrap();
    assert!(!listed.completed_today);
    assert_eq!(listed.total_completions, 0);

    let dated: CompletionResponse = client
        .post(&url)
        .json(&serde_json::json!({ "date": "2024-03-01" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dated.date, "2024-03-01");
    assert!(dated.completed);
}
