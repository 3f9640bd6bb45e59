//! End-to-end tests for the typed command façade, driven against a
//! scripted in-process peer that replays realistic reply payloads.

mod common;

use std::sync::{Arc, Mutex};

use common::{command_of, ok_payload, reply_to, spawn_peer, test_config, word, TEST_CLSID};
use ukey_client::{
    ContainerType, FileRight, Handle, OperationError, PinType, UkeyClient,
};

/// Spawns a peer scripted with one canned reply per command and returns a
/// connected client.
async fn scripted_client() -> UkeyClient {
    let url = spawn_peer(|req| {
        let reply = match command_of(&req).as_str() {
            "LoadModule" => reply_to(&req, true, ""),

            // ── success payloads ────────────────────────────────────────
            // status ok, size 10, "AB" + NUL padding
            "EnumDev" => reply_to(&req, true, &ok_payload(&format!("{}4142000000000000", word(10)))),
            "ConnectDev" => reply_to(&req, true, &ok_payload(&word(123_456))),
            // boolean-style decimal status
            "DisConnectDev" => reply_to(&req, true, "0"),
            "GetContainerType" => reply_to(&req, true, &ok_payload(&word(2))),
            "ExportCertificate" => {
                reply_to(&req, true, &ok_payload(&format!("{}308201aa", word(4))))
            }
            "GenECCKeyPair" => {
                let x = "11".repeat(64);
                let y = "22".repeat(64);
                reply_to(&req, true, &ok_payload(&format!("{}{x}{y}", word(256))))
            }
            "ECCSignData" => {
                let r = format!("{}{}", "00".repeat(32), "aa".repeat(32));
                let s = format!("{}{}", "00".repeat(32), "bb".repeat(32));
                reply_to(&req, true, &ok_payload(&format!("{r}{s}")))
            }
            "GetDevInfo" => {
                let mut payload = ok_payload(&"00".repeat(130));
                payload.push_str("544f4b454e"); // "TOKEN"
                payload.push_str(&"00".repeat(27));
                payload.push_str("534e3031"); // "SN01"
                payload.push_str(&"00".repeat(28));
                reply_to(&req, true, &payload)
            }
            "GetSKFileInfo" => {
                let name = format!("{}{}", "636572742e646572", "00".repeat(24)); // "cert.der"
                let rest = format!("{name}{}{}{}", word(1024), word(0x10), word(0x01));
                reply_to(&req, true, &ok_payload(&rest))
            }

            // ── failure payloads ────────────────────────────────────────
            // PIN incorrect, 3 attempts left
            "VerifyPIN" => {
                reply_to(&req, true, &format!("{}{}", word(0x0a00_0024), word(3)))
            }
            // application not found
            "OpenApplication" => reply_to(&req, true, &word(0x0a00_002e)),
            // a status word outside the table
            "GenRandomData" => reply_to(&req, true, &word(0x0b12_3456)),
            // success status but an empty enumeration block
            "EnumContainer" => reply_to(&req, true, &ok_payload(&word(0))),
            // transport-level failure: Result flag false
            "Encrypt" => reply_to(&req, false, "device unplugged"),

            other => reply_to(&req, false, &format!("unscripted command: {other}")),
        };
        vec![reply]
    })
    .await;

    UkeyClient::connect(test_config(url)).await.unwrap()
}

#[tokio::test]
async fn test_load_module_succeeds() {
    let client = scripted_client().await;
    client.load_module().await.unwrap();
}

#[tokio::test]
async fn test_enum_dev_decodes_device_list() {
    // The canonical enumeration scenario: one device named "AB".
    let client = scripted_client().await;
    let devices = client.enum_dev(true).await.unwrap();
    assert_eq!(devices, vec!["AB".to_string()]);
}

#[tokio::test]
async fn test_connect_dev_returns_handle() {
    let client = scripted_client().await;
    let handle = client.connect_dev("AB").await.unwrap();
    assert_eq!(handle, Handle(123_456));
}

#[tokio::test]
async fn test_disconnect_dev_accepts_decimal_status() {
    // Boolean-style commands reply with decimal text, not hex.
    let client = scripted_client().await;
    client.disconnect_dev(Handle(123_456)).await.unwrap();
}

#[tokio::test]
async fn test_get_dev_info_reads_label_and_serial() {
    let client = scripted_client().await;
    let info = client.get_dev_info(Handle(1)).await.unwrap();
    assert_eq!(info.label, "TOKEN");
    assert_eq!(info.serial_number, "SN01");
}

#[tokio::test]
async fn test_verify_pin_failure_carries_table_entry_and_attempts() {
    // Arrange
    let client = scripted_client().await;

    // Act
    let err = client
        .verify_pin(Handle(2), PinType::User, "000000")
        .await
        .unwrap_err();

    // Assert: classified through the status table, attempts preserved
    match err {
        OperationError::Status {
            op,
            code,
            stable_id,
            description,
            remaining_attempts,
        } => {
            assert_eq!(op, "VerifyPIN");
            assert_eq!(code, 0x0a00_0024);
            assert_eq!(stable_id, "sar_pin_incorrect");
            assert_eq!(description, "PIN不正确");
            assert_eq!(remaining_attempts, Some(3));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_open_application_failure_maps_status() {
    let client = scripted_client().await;
    let err = client.open_application(Handle(1), "app").await.unwrap_err();
    match err {
        OperationError::Status { stable_id, remaining_attempts, .. } => {
            assert_eq!(stable_id, "sar_application_not_exists");
            assert_eq!(remaining_attempts, None, "only PIN commands carry attempts");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_status_code_is_a_failure_not_success() {
    let client = scripted_client().await;
    let err = client.gen_random(Handle(1), 16).await.unwrap_err();
    match err {
        OperationError::Status { code, stable_id, .. } => {
            assert_eq!(code, 0x0b12_3456);
            assert_eq!(stable_id, "unknown");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_enumeration_is_a_decode_failure() {
    // Peer says success but declares a zero-length element block; this is
    // the decode failure class, distinct from a status failure.
    let client = scripted_client().await;
    let err = client.enum_container(Handle(2)).await.unwrap_err();
    assert!(
        matches!(err, OperationError::Decode { op: "EnumContainer", .. }),
        "expected Decode, got {err:?}"
    );
}

#[tokio::test]
async fn test_result_false_is_a_transport_failure() {
    // A false Result flag short-circuits before any status decoding.
    let client = scripted_client().await;
    let err = client.encrypt(Handle(9), "00ff").await.unwrap_err();
    match err {
        OperationError::Transport { op, detail } => {
            assert_eq!(op, "Encrypt");
            assert_eq!(detail, "device unplugged");
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_container_type_maps_word() {
    let client = scripted_client().await;
    let kind = client.get_container_type(Handle(3)).await.unwrap();
    assert_eq!(kind, ContainerType::Ecc);
}

#[tokio::test]
async fn test_export_certificate_returns_blob() {
    let client = scripted_client().await;
    let cert = client.export_certificate(Handle(3), true).await.unwrap();
    assert_eq!(cert, "308201aa");
}

#[tokio::test]
async fn test_gen_ecc_key_pair_decodes_coordinates() {
    let client = scripted_client().await;
    let key = client.gen_ecc_key_pair(Handle(3)).await.unwrap();
    assert_eq!(key.bits, 256);
    assert_eq!(key.x, "11".repeat(64));
    assert_eq!(key.y, "22".repeat(64));
}

#[tokio::test]
async fn test_ecc_sign_data_extracts_significant_halves() {
    let client = scripted_client().await;
    let sig = client.ecc_sign_data(Handle(3), "abcd").await.unwrap();
    assert_eq!(sig.signature, format!("{}{}", "aa".repeat(32), "bb".repeat(32)));
}

#[tokio::test]
async fn test_get_file_info_decodes_attributes() {
    let client = scripted_client().await;
    let info = client.get_file_info(Handle(2), "cert.der").await.unwrap();
    assert_eq!(info.name, "cert.der");
    assert_eq!(info.size, 1024);
    assert_eq!(info.read_right, FileRight::User);
    assert_eq!(info.write_right, FileRight::Admin);
}

#[tokio::test]
async fn test_method_field_carries_command_and_class_id() {
    // Arrange: record the raw Method strings the client puts on the wire
    let methods: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let methods_peer = Arc::clone(&methods);
    let url = spawn_peer(move |req| {
        if let Some(method) = req["Method"].as_str() {
            methods_peer.lock().unwrap().push(method.to_string());
        }
        vec![reply_to(
            &req,
            true,
            &ok_payload(&format!("{}4142000000000000", word(10))),
        )]
    })
    .await;
    let client = UkeyClient::connect(test_config(url)).await.unwrap();

    // Act
    client.enum_dev(true).await.unwrap();

    // Assert
    assert_eq!(
        *methods.lock().unwrap(),
        vec![format!("EnumDev|{TEST_CLSID}")]
    );
}

#[tokio::test]
async fn test_concurrent_operations_each_get_their_own_result() {
    // Two different commands in flight at once must not cross wires.
    let client = Arc::new(scripted_client().await);
    let c1 = Arc::clone(&client);
    let c2 = Arc::clone(&client);

    let (devices, handle) = tokio::join!(c1.enum_dev(true), c2.connect_dev("AB"));

    assert_eq!(devices.unwrap(), vec!["AB".to_string()]);
    assert_eq!(handle.unwrap(), Handle(123_456));
}

#[tokio::test]
async fn test_close_makes_operations_fail_with_transport_error() {
    let client = scripted_client().await;
    client.close().await;

    let err = client.enum_dev(true).await.unwrap_err();
    assert!(matches!(err, OperationError::Transport { op: "EnumDev", .. }));
}
