use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use super::TestApp;
use crate::auth::verify_password;
use crate::config::AppConfig;

fn jurnal_body(siswa_id: &str, tanggal: &str, kebiasaan: &str) -> Value {
    json!({
        "siswa_id": siswa_id,
        "tanggal": tanggal,
        "kebiasaan": kebiasaan,
        "aktivitas": "Sholat subuh berjamaah di masjid",
        "refleksi": "Saya merasa lebih tenang dan siap belajar",
        "nilai_karakter": 4
    })
}

#[tokio::test]
async fn register_hides_password_and_stores_hash() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "andi",
                "email": "andi@smkn4jkt.sch.id",
                "password": "rahasia123",
                "role": "siswa"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User berhasil didaftarkan");
    assert_eq!(body["data"]["user"]["username"], "andi");
    assert_eq!(body["data"]["user"]["nama_lengkap"], "andi");
    assert!(body["data"]["token"].is_string());
    assert!(!body.to_string().contains("password"));

    let users = app.store.documents("users");
    let hash = users[0]["password"].as_str().unwrap();
    assert!(verify_password("rahasia123", hash).await.unwrap());
    assert!(!verify_password("salah", hash).await.unwrap());
}

#[tokio::test]
async fn register_rejects_duplicate_username_or_email() {
    let app = TestApp::new();
    app.token().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "lain",
                "email": "sari@smkn4jkt.sch.id",
                "password": "rahasia123",
                "role": "teacher"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username atau email sudah terdaftar");
}

#[tokio::test]
async fn register_lists_every_violation() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "username": "ab", "email": "bukan-email", "password": "123", "role": "root" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password", "role", "username"]);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.token().await;

    let (wrong_status, wrong_body) = app
        .request(Method::POST, "/auth/login", None, Some(json!({ "username": "bu_sari", "password": "keliru" })))
        .await;
    let (unknown_status, unknown_body) = app
        .request(Method::POST, "/auth/login", None, Some(json!({ "username": "tidak_ada", "password": "keliru" })))
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Username atau password salah");
}

#[tokio::test]
async fn login_by_email_updates_last_login() {
    let app = TestApp::new();
    app.token().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "sari@smkn4jkt.sch.id", "password": "rahasia123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login berhasil");

    let token = body["data"]["token"].as_str().unwrap();
    let (status, me) = app.get("/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], "sari@smkn4jkt.sch.id");
    assert_eq!(me["data"]["role"], "guru");

    assert!(app.store.documents("users")[0]["last_login"].is_string());
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/siswa", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/jurnal", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let other = TestApp::with_config({
        let mut config = AppConfig::for_tests();
        config.security.jwt_secret = "another-secret".to_string();
        config
    });
    let foreign = other.token().await;
    let (status, _) = app.get("/auth/me", &foreign).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_routes() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/jurnal/kebiasaan", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 7);
    assert_eq!(body["data"]["kebiasaan"][3], "Gotong Royong");

    let (status, body) = app.request(Method::POST, "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout berhasil");

    let (status, body) = app.request(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Jurnal Digital SMKN 4 Jakarta");

    let (status, body) = app.request(Method::GET, "/tidak-ada", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["service"], "Jurnal Digital SMKN 4 Jakarta");

    app.store.set_offline(true);
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["data"]["status"], "degraded");
}

#[tokio::test]
async fn siswa_nis_is_unique() {
    let app = TestApp::new();
    let token = app.token().await;
    let body = json!({ "nis": "12345678", "nama_lengkap": "Ani", "kelas": "X-1", "jurusan": "RPL" });

    let (status, created) = app.post("/siswa", &token, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["nis"], "12345678");
    assert_eq!(created["data"]["status"], "active");
    assert!(created["data"]["id"].as_str().unwrap().len() == 24);

    let (status, again) = app.post("/siswa", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(again["message"], "NIS sudah terdaftar");
}

#[tokio::test]
async fn siswa_length_rules_apply_to_trimmed_text() {
    let app = TestApp::new();
    let token = app.token().await;

    let padded = json!({ "nis": " 1234567 ", "nama_lengkap": "  Al ", "kelas": "X-1", "jurusan": "RPL" });
    let (status, body) = app.post("/siswa", &token, padded).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!([
            { "field": "nama_lengkap", "message": "Nama minimal 3 karakter" },
            { "field": "nis", "message": "NIS harus 8-10 karakter" }
        ])
    );
    assert!(app.store.documents("siswa").is_empty());

    let (status, body) = app
        .post(
            "/siswa",
            &token,
            json!({ "nis": " 12345678 ", "nama_lengkap": " Ani ", "kelas": "X-1", "jurusan": "RPL" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["nis"], "12345678");
    assert_eq!(body["data"]["nama_lengkap"], "Ani");

    let path = format!("/siswa/{}", body["data"]["id"].as_str().unwrap());
    let (status, body) = app.put(&path, &token, json!({ "nama_lengkap": " Bo " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "nama_lengkap");
}

#[tokio::test]
async fn siswa_list_pages_and_filters() {
    let app = TestApp::new();
    let token = app.token().await;
    for i in 0..15 {
        app.create_siswa(&token, &format!("100000{:02}", i), "X-1").await;
    }
    app.create_siswa(&token, "20000001", "XI-2").await;

    let (status, body) = app.get("/siswa?kelas=X-1&page=2&limit=10", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["siswa"].as_array().unwrap().len(), 5);
    assert_eq!(
        body["data"]["pagination"],
        json!({ "current_page": 2, "total_pages": 2, "total_students": 15, "per_page": 10 })
    );

    let (_, body) = app.get("/siswa?search=10000014&limit=abc", &token).await;
    assert_eq!(body["data"]["pagination"]["total_students"], 1);
    assert_eq!(body["data"]["pagination"]["per_page"], 10);

    let (_, body) = app.get("/siswa?status=inactive", &token).await;
    assert_eq!(body["data"]["pagination"]["total_students"], 0);
    assert_eq!(body["data"]["pagination"]["total_pages"], 0);
}

#[tokio::test]
async fn malformed_query_strings_use_error_envelope() {
    let app = TestApp::new();
    let token = app.token().await;

    for path in ["/siswa?kelas=X-1&kelas=X-2", "/guru?search=a&search=b", "/jurnal?page=1&page=2"] {
        let (status, body) = app.get(path, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_JSON");
    }
}

#[tokio::test]
async fn siswa_update_and_lookup() {
    let app = TestApp::new();
    let token = app.token().await;
    let id = app.create_siswa(&token, "12345678", "X-1").await;

    let patch = json!({ "kelas": "XI-1", "tanggal_lahir": "2008-05-01" });
    let (status, first) = app.put(&format!("/siswa/{}", id), &token, patch.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Data siswa berhasil diperbarui");
    let (_, second) = app.put(&format!("/siswa/{}", id), &token, patch).await;

    let mut a = first["data"].clone();
    let mut b = second["data"].clone();
    a["updated_at"] = Value::Null;
    b["updated_at"] = Value::Null;
    assert_eq!(a, b);
    assert_eq!(b["kelas"], "XI-1");
    assert_eq!(b["nis"], "12345678");

    let (status, body) = app.put(&format!("/siswa/{}", id), &token, json!({ "nis": "99999999" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");

    let (status, _) = app.get("/siswa/bukan-id", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = app.get("/siswa/507f1f77bcf86cd799439011", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Siswa tidak ditemukan");
}

#[tokio::test]
async fn siswa_detail_includes_habit_statistics() {
    let app = TestApp::new();
    let token = app.token().await;
    let id = app.create_siswa(&token, "12345678", "X-1").await;

    for (tanggal, kebiasaan, nilai) in [
        ("2024-07-01", "Religius", 4),
        ("2024-07-02", "Religius", 5),
        ("2024-07-01", "Mandiri", 3),
    ] {
        let mut body = jurnal_body(&id, tanggal, kebiasaan);
        body["nilai_karakter"] = json!(nilai);
        let (status, _) = app.post("/jurnal", &token, body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get(&format!("/siswa/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["siswa"]["id"], id.as_str());
    assert_eq!(
        body["data"]["jurnal_statistics"],
        json!([
            { "kebiasaan": "Mandiri", "total_entries": 1, "avg_nilai": 3.0 },
            { "kebiasaan": "Religius", "total_entries": 2, "avg_nilai": 4.5 }
        ])
    );
}

#[tokio::test]
async fn guru_crud() {
    let app = TestApp::new();
    let token = app.token().await;
    let body = json!({ "nip": "198001012005", "nama_lengkap": "Budi Santoso", "mata_pelajaran": "Matematika" });

    let (status, created) = app.post("/guru", &token, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, dup) = app.post("/guru", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(dup["message"], "NIP sudah terdaftar");

    let (status, updated) = app.put(&format!("/guru/{}", id), &token, json!({ "status": "inactive" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["status"], "inactive");

    let (_, active) = app.get("/guru", &token).await;
    assert_eq!(active["data"]["pagination"]["total_teachers"], 0);
    let (_, inactive) = app.get("/guru?status=inactive&search=budi", &token).await;
    assert_eq!(inactive["data"]["guru"][0]["nip"], "198001012005");

    let (status, fetched) = app.get(&format!("/guru/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["mata_pelajaran"], "Matematika");
}

#[tokio::test]
async fn jurnal_snapshot_and_duplicate() {
    let app = TestApp::new();
    let token = app.token().await;
    let siswa_id = app.create_siswa(&token, "12345678", "X-1").await;

    let (status, created) = app
        .post("/jurnal", &token, jurnal_body(&siswa_id, "2024-07-15T08:00:00Z", "Religius"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Jurnal berhasil disimpan");
    let entry = &created["data"];
    assert_eq!(entry["nama_siswa"], "Siswa 12345678");
    assert_eq!(entry["kelas"], "X-1");
    assert_eq!(entry["jurusan"], "RPL");
    assert_eq!(entry["tanggal"], "2024-07-15");
    assert_eq!(entry["status"], "submitted");
    assert_eq!(entry["catatan_guru"], "");

    let (status, dup) = app
        .post("/jurnal", &token, jurnal_body(&siswa_id, "2024-07-15", "Religius"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(dup["message"], "Jurnal untuk kebiasaan ini sudah ada pada tanggal tersebut");

    let (status, _) = app
        .post("/jurnal", &token, jurnal_body(&siswa_id, "2024-07-15", "Mandiri"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn jurnal_validation_and_missing_student() {
    let app = TestApp::new();
    let token = app.token().await;
    let siswa_id = app.create_siswa(&token, "12345678", "X-1").await;

    let mut short = jurnal_body(&siswa_id, "2024-07-15", "Religius");
    short["aktivitas"] = json!("Lari.");
    let (status, body) = app.post("/jurnal", &token, short).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!([{ "field": "aktivitas", "message": "Aktivitas minimal 10 karakter" }]));

    let mut bad = jurnal_body("12345", "15-07-2024", "Disiplin");
    bad["nilai_karakter"] = json!(6);
    let (status, body) = app.post("/jurnal", &token, bad).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["kebiasaan", "nilai_karakter", "siswa_id", "tanggal"]);

    let (status, body) = app
        .post("/jurnal", &token, jurnal_body("507f1f77bcf86cd799439011", "2024-07-15", "Religius"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Siswa tidak ditemukan");
}

#[tokio::test]
async fn jurnal_nilai_karakter_accepts_numeric_text() {
    let app = TestApp::new();
    let token = app.token().await;
    let siswa_id = app.create_siswa(&token, "12345678", "X-1").await;

    let mut body = jurnal_body(&siswa_id, "2024-07-15", "Religius");
    body["nilai_karakter"] = json!("4");
    let (status, created) = app.post("/jurnal", &token, body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["nilai_karakter"], 4);

    for bad in [json!("9"), json!("empat"), json!(2.5)] {
        let mut body = jurnal_body(&siswa_id, "2024-07-16", "Religius");
        body["nilai_karakter"] = bad;
        let (status, rejected) = app.post("/jurnal", &token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected["code"], "VALIDATION_ERROR");
        assert_eq!(
            rejected["errors"],
            json!([{ "field": "nilai_karakter", "message": "Nilai karakter 1-5" }])
        );
    }

    let path = format!("/jurnal/{}", created["data"]["id"].as_str().unwrap());
    let (status, updated) = app.put(&path, &token, json!({ "nilai_karakter": "2" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["nilai_karakter"], 2);
}

#[tokio::test]
async fn jurnal_list_filters_and_orders() {
    let app = TestApp::new();
    let token = app.token().await;
    let ani = app.create_siswa(&token, "12345678", "X-1").await;
    let budi = app.create_siswa(&token, "87654321", "XI-2").await;

    for (siswa, tanggal, kebiasaan) in [
        (&ani, "2024-06-30", "Religius"),
        (&ani, "2024-07-01", "Religius"),
        (&ani, "2024-07-31", "Mandiri"),
        (&ani, "2024-08-01", "Kreatif"),
        (&budi, "2024-07-10", "Religius"),
    ] {
        let (status, _) = app.post("/jurnal", &token, jurnal_body(siswa, tanggal, kebiasaan)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .get(
            &format!("/jurnal?siswa_id={}&tanggal_mulai=2024-07-01&tanggal_selesai=2024-07-31", ani),
            &token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body["data"]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["tanggal"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-07-31", "2024-07-01"]);
    assert_eq!(body["data"]["pagination"]["total_entries"], 2);

    let (_, body) = app.get("/jurnal?kebiasaan=Religius&kelas=XI-2", &token).await;
    assert_eq!(body["data"]["pagination"]["total_entries"], 1);

    let (_, body) = app.get("/jurnal?limit=2&page=3", &token).await;
    assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["pagination"]["total_pages"], 3);

    let (status, body) = app.get("/jurnal?siswa_id=xyz", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "siswa_id");

    let (status, _) = app.get("/jurnal?tanggal_mulai=kemarin", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn jurnal_update_is_partial_and_idempotent() {
    let app = TestApp::new();
    let token = app.token().await;
    let siswa_id = app.create_siswa(&token, "12345678", "X-1").await;
    let (_, created) = app.post("/jurnal", &token, jurnal_body(&siswa_id, "2024-07-15", "Religius")).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let path = format!("/jurnal/{}", id);

    let patch = json!({ "catatan_guru": "Pertahankan!", "nilai_karakter": 5 });
    let (status, first) = app.put(&path, &token, patch.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Jurnal berhasil diperbarui");
    let (_, second) = app.put(&path, &token, patch).await;

    assert_eq!(second["data"]["nilai_karakter"], 5);
    assert_eq!(second["data"]["catatan_guru"], "Pertahankan!");
    assert_eq!(second["data"]["aktivitas"], created["data"]["aktivitas"]);
    assert_eq!(first["data"]["refleksi"], second["data"]["refleksi"]);

    let (status, body) = app.put(&path, &token, json!({ "kebiasaan": "Mandiri" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");

    let (status, body) = app.put(&path, &token, json!({ "refleksi": "pendek" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "refleksi");

    let (status, body) = app
        .put("/jurnal/507f1f77bcf86cd799439011", &token, json!({ "nilai_karakter": 3 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Jurnal tidak ditemukan");
}

#[tokio::test]
async fn store_failures_hide_detail_unless_debugging() {
    let app = TestApp::new();
    let token = app.token().await;
    app.store.set_broken(true);

    let (status, body) = app.get("/siswa", &token).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Terjadi kesalahan server");
    assert!(body.get("error").is_none());

    let debug = TestApp::with_config({
        let mut config = AppConfig::for_tests();
        config.security.debug_errors = true;
        config
    });
    let token = debug.token().await;
    debug.store.set_broken(true);
    let (status, body) = debug.get("/siswa", &token).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("relation does not exist"));
}
