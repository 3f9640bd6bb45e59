//! Typed command façade over the transport session.
//!
//! Every public operation follows the same pipeline:
//!
//! 1. Send the command through the correlator and await its single reply.
//! 2. If the envelope's `Result` flag is false, return a generic transport
//!    failure — the payload is not the expected hex shape, so no status
//!    decoding is attempted.
//! 3. Otherwise decode the payload with the command's [`ResponseRule`];
//!    a non-zero status word classifies through the status table (plus the
//!    remaining-attempts count for PIN commands).
//! 4. On success, return the operation's typed payload.
//!
//! Errors are always returned as data, never panicked; the three
//! [`OperationError`] variants are the protocol's three disjoint failure
//! classes.
//!
//! Handles are opaque here: the façade threads them through without
//! validating the device → application → container hierarchy.  Closing a
//! parent does not invalidate locally held child handles — the peer
//! rejects stale handles itself, and that rejection surfaces as a normal
//! status failure.

use serde_json::{json, Value};
use thiserror::Error;

use ukey_core::skf::decode::{
    decode_response, ContainerType, DecodedResponse, DeviceInfo, EccPublicKey, EccSignature,
    FileInfo, FileRight, Handle, ResponseError, ResponseRule, RsaPublicKey,
};
use ukey_core::skf::status;

use crate::domain::ClientConfig;
use crate::infrastructure::session::WsSession;

// ── Error type ────────────────────────────────────────────────────────────────

/// A failed operation, as one of the three disjoint error classes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The reply never decoded: connection failure, timeout, or the
    /// envelope's `Result` flag was false.
    #[error("{op} error: {detail}")]
    Transport { op: &'static str, detail: String },

    /// The peer reported a non-zero status word.
    #[error("{op} failed: {description} ({stable_id}, 0x{code:08x})")]
    Status {
        op: &'static str,
        /// Raw status word, kept even when the table has no entry for it.
        code: u32,
        stable_id: &'static str,
        description: &'static str,
        /// Remaining PIN attempts; `Some` only for `VerifyPIN`/`ChangePIN`
        /// failures (0 when the field was undecodable).
        remaining_attempts: Option<u32>,
    },

    /// The peer claimed success but the payload contradicts its layout.
    #[error("{op} error: {detail}")]
    Decode { op: &'static str, detail: String },
}

impl OperationError {
    /// Maps a decode-layer failure into the operation's error class,
    /// classifying status words against the table.  Unknown codes get the
    /// generic unknown-failure identifiers — never success.
    fn classify(op: &'static str, err: ResponseError) -> Self {
        match err {
            ResponseError::Status {
                code,
                remaining_attempts,
            } => {
                let (stable_id, description) = match status::by_code(code) {
                    Some(entry) => (entry.stable_id, entry.description),
                    None => (status::UNKNOWN_STABLE_ID, status::UNKNOWN_DESCRIPTION),
                };
                OperationError::Status {
                    op,
                    code,
                    stable_id,
                    description,
                    remaining_attempts,
                }
            }
            ResponseError::Malformed(detail) => OperationError::Decode { op, detail },
        }
    }
}

/// Which PIN a `VerifyPIN`/`ChangePIN` command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinType {
    Admin,
    User,
}

impl PinType {
    /// Wire value: 0 for the admin PIN, 1 for the user PIN.
    pub fn word(&self) -> u32 {
        match self {
            PinType::Admin => 0,
            PinType::User => 1,
        }
    }
}

// ── Façade ────────────────────────────────────────────────────────────────────

/// Typed client for the UKey control process.
///
/// Operations may be called concurrently from multiple tasks; each gets an
/// independent correlation id and completion, with no FIFO ordering
/// between distinct operations.  No operation retries internally — retry
/// policy belongs to the caller.
pub struct UkeyClient {
    session: WsSession,
    config: ClientConfig,
}

impl UkeyClient {
    /// Connects to the control process described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the WebSocket handshake fails.  No bootstrap is
    /// performed here; call [`load_module`](Self::load_module) before the
    /// first command.
    pub async fn connect(config: ClientConfig) -> anyhow::Result<Self> {
        let session = WsSession::connect(&config.ws_url, config.request_timeout).await?;
        Ok(Self { session, config })
    }

    /// The underlying transport session (state and diagnostics).
    pub fn session(&self) -> &WsSession {
        &self.session
    }

    /// Closes the session; every in-flight operation fails with a
    /// connection-closed transport error.
    pub async fn close(&self) {
        self.session.close().await;
    }

    /// Loads the remote control module.  Must succeed once per session
    /// before any command is issued.
    pub async fn load_module(&self) -> Result<(), OperationError> {
        const OP: &str = "LoadModule";
        let frame = self
            .session
            .load_module(&self.config.module_name)
            .await
            .map_err(|e| OperationError::Transport {
                op: OP,
                detail: e.to_string(),
            })?;
        if !frame.succeeded {
            return Err(OperationError::Transport {
                op: OP,
                detail: frame.payload,
            });
        }
        Ok(())
    }

    // ── Device management ─────────────────────────────────────────────────────

    /// Enumerates device names; `present_only` restricts the list to
    /// currently attached tokens.
    pub async fn enum_dev(&self, present_only: bool) -> Result<Vec<String>, OperationError> {
        let resp = self
            .execute("EnumDev", vec![json!(present_only)], ResponseRule::NameList)
            .await?;
        expect_names("EnumDev", resp)
    }

    /// Connects to a device by name, returning its handle.
    pub async fn connect_dev(&self, dev_name: &str) -> Result<Handle, OperationError> {
        let resp = self
            .execute("ConnectDev", vec![json!(dev_name)], ResponseRule::Handle)
            .await?;
        expect_handle("ConnectDev", resp)
    }

    /// Disconnects a device.
    pub async fn disconnect_dev(&self, dev: Handle) -> Result<(), OperationError> {
        let resp = self
            .execute("DisConnectDev", vec![json!(dev.0)], ResponseRule::Status)
            .await?;
        expect_unit("DisConnectDev", resp)
    }

    /// Sets the device label.
    pub async fn set_label(&self, dev: Handle, label: &str) -> Result<(), OperationError> {
        let resp = self
            .execute("SetLabel", vec![json!(dev.0), json!(label)], ResponseRule::Status)
            .await?;
        expect_unit("SetLabel", resp)
    }

    /// Reads the device label and serial number.
    pub async fn get_dev_info(&self, dev: Handle) -> Result<DeviceInfo, OperationError> {
        let resp = self
            .execute("GetDevInfo", vec![json!(dev.0)], ResponseRule::DeviceInfo)
            .await?;
        expect_device_info("GetDevInfo", resp)
    }

    /// Generates `length` random bytes on the device, returned as hex.
    pub async fn gen_random(&self, dev: Handle, length: u32) -> Result<String, OperationError> {
        let resp = self
            .execute(
                "GenRandomData",
                vec![json!(dev.0), json!(length)],
                ResponseRule::Blob,
            )
            .await?;
        expect_blob("GenRandomData", resp)
    }

    // ── Application management ────────────────────────────────────────────────

    pub async fn enum_application(&self, dev: Handle) -> Result<Vec<String>, OperationError> {
        let resp = self
            .execute("EnumApplication", vec![json!(dev.0)], ResponseRule::NameList)
            .await?;
        expect_names("EnumApplication", resp)
    }

    pub async fn open_application(
        &self,
        dev: Handle,
        app_name: &str,
    ) -> Result<Handle, OperationError> {
        let resp = self
            .execute(
                "OpenApplication",
                vec![json!(dev.0), json!(app_name)],
                ResponseRule::Handle,
            )
            .await?;
        expect_handle("OpenApplication", resp)
    }

    pub async fn close_application(&self, app: Handle) -> Result<(), OperationError> {
        let resp = self
            .execute("CloseApplication", vec![json!(app.0)], ResponseRule::Status)
            .await?;
        expect_unit("CloseApplication", resp)
    }

    /// Verifies a PIN.  A wrong PIN fails with `sar_pin_incorrect` and the
    /// remaining-attempts count in the error.
    pub async fn verify_pin(
        &self,
        app: Handle,
        pin_type: PinType,
        pin: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "VerifyPIN",
                vec![json!(app.0), json!(pin_type.word()), json!(pin)],
                ResponseRule::PinGuarded,
            )
            .await?;
        expect_unit("VerifyPIN", resp)
    }

    /// Changes a PIN; failure semantics match [`verify_pin`](Self::verify_pin).
    pub async fn change_pin(
        &self,
        app: Handle,
        pin_type: PinType,
        old_pin: &str,
        new_pin: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "ChangePIN",
                vec![
                    json!(app.0),
                    json!(pin_type.word()),
                    json!(old_pin),
                    json!(new_pin),
                ],
                ResponseRule::PinGuarded,
            )
            .await?;
        expect_unit("ChangePIN", resp)
    }

    // ── Container management ──────────────────────────────────────────────────

    pub async fn enum_container(&self, app: Handle) -> Result<Vec<String>, OperationError> {
        let resp = self
            .execute("EnumContainer", vec![json!(app.0)], ResponseRule::NameList)
            .await?;
        expect_names("EnumContainer", resp)
    }

    pub async fn create_container(
        &self,
        app: Handle,
        name: &str,
    ) -> Result<Handle, OperationError> {
        let resp = self
            .execute(
                "CreateContainer",
                vec![json!(app.0), json!(name)],
                ResponseRule::Handle,
            )
            .await?;
        expect_handle("CreateContainer", resp)
    }

    pub async fn open_container(&self, app: Handle, name: &str) -> Result<Handle, OperationError> {
        let resp = self
            .execute(
                "OpenContainer",
                vec![json!(app.0), json!(name)],
                ResponseRule::Handle,
            )
            .await?;
        expect_handle("OpenContainer", resp)
    }

    pub async fn close_container(&self, con: Handle) -> Result<(), OperationError> {
        let resp = self
            .execute("CloseContainer", vec![json!(con.0)], ResponseRule::Status)
            .await?;
        expect_unit("CloseContainer", resp)
    }

    pub async fn delete_container(&self, app: Handle, name: &str) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "DeleteContainer",
                vec![json!(app.0), json!(name)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("DeleteContainer", resp)
    }

    pub async fn get_container_type(&self, con: Handle) -> Result<ContainerType, OperationError> {
        let resp = self
            .execute(
                "GetContainerType",
                vec![json!(con.0)],
                ResponseRule::ContainerType,
            )
            .await?;
        expect_container_type("GetContainerType", resp)
    }

    // ── Certificates and public keys ──────────────────────────────────────────

    /// Imports a certificate; `sign_cert` selects the signature (`true`)
    /// or encryption (`false`) slot.
    pub async fn import_certificate(
        &self,
        con: Handle,
        sign_cert: bool,
        cert_hex: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "ImportCertificate",
                vec![json!(con.0), json!(sign_cert), json!(cert_hex)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("ImportCertificate", resp)
    }

    /// Exports a certificate as DER hex.
    pub async fn export_certificate(
        &self,
        con: Handle,
        sign_cert: bool,
    ) -> Result<String, OperationError> {
        let resp = self
            .execute(
                "ExportCertificate",
                vec![json!(con.0), json!(sign_cert)],
                ResponseRule::Blob,
            )
            .await?;
        expect_blob("ExportCertificate", resp)
    }

    /// Exports a public key blob as hex.
    pub async fn export_public_key(
        &self,
        con: Handle,
        sign_key: bool,
    ) -> Result<String, OperationError> {
        let resp = self
            .execute(
                "ExportPublicKey",
                vec![json!(con.0), json!(sign_key)],
                ResponseRule::Blob,
            )
            .await?;
        expect_blob("ExportPublicKey", resp)
    }

    // ── RSA ───────────────────────────────────────────────────────────────────

    /// Generates an RSA key pair in the container (`bits` is 1024 or 2048)
    /// and returns the public half.
    pub async fn gen_rsa_key_pair(
        &self,
        con: Handle,
        bits: u32,
    ) -> Result<RsaPublicKey, OperationError> {
        let resp = self
            .execute(
                "GenRSAKeyPair",
                vec![json!(con.0), json!(bits)],
                ResponseRule::RsaKeyPair,
            )
            .await?;
        expect_rsa_key("GenRSAKeyPair", resp)
    }

    /// Imports a wrapped RSA key pair: the session key encrypted to the
    /// container's key, and the private key encrypted under that session
    /// key.
    pub async fn import_rsa_key_pair(
        &self,
        con: Handle,
        alg_id: u32,
        wrapped_session_key_hex: &str,
        wrapped_private_key_hex: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "ImportRSAKeyPair",
                vec![
                    json!(con.0),
                    json!(alg_id),
                    json!(wrapped_session_key_hex),
                    json!(wrapped_private_key_hex),
                ],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("ImportRSAKeyPair", resp)
    }

    /// Signs `data_hex` with the container's RSA signature key.
    pub async fn rsa_sign_data(
        &self,
        con: Handle,
        data_hex: &str,
    ) -> Result<String, OperationError> {
        let resp = self
            .execute(
                "RSASignData",
                vec![json!(con.0), json!(data_hex)],
                ResponseRule::Blob,
            )
            .await?;
        expect_blob("RSASignData", resp)
    }

    /// Generates a session key and exports it encrypted to `pub_key_hex`.
    pub async fn rsa_export_session_key(
        &self,
        con: Handle,
        alg_id: u32,
        pub_key_hex: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "RSAExportSessionKey",
                vec![json!(con.0), json!(alg_id), json!(pub_key_hex)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("RSAExportSessionKey", resp)
    }

    // ── ECC (SM2) ─────────────────────────────────────────────────────────────

    /// Generates an SM2 key pair in the container and returns the public
    /// half.
    pub async fn gen_ecc_key_pair(&self, con: Handle) -> Result<EccPublicKey, OperationError> {
        let resp = self
            .execute("GenECCKeyPair", vec![json!(con.0)], ResponseRule::EccKeyPair)
            .await?;
        expect_ecc_key("GenECCKeyPair", resp)
    }

    /// Imports an enveloped SM2 key pair.
    pub async fn import_ecc_key_pair(
        &self,
        con: Handle,
        enveloped_key_hex: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "ImportECCKeyPair",
                vec![json!(con.0), json!(enveloped_key_hex)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("ImportECCKeyPair", resp)
    }

    /// Signs `data_hex` with the container's SM2 signature key.
    pub async fn ecc_sign_data(
        &self,
        con: Handle,
        data_hex: &str,
    ) -> Result<EccSignature, OperationError> {
        let resp = self
            .execute(
                "ECCSignData",
                vec![json!(con.0), json!(data_hex)],
                ResponseRule::EccSignature,
            )
            .await?;
        expect_ecc_signature("ECCSignData", resp)
    }

    /// Generates a session key and exports it encrypted to the SM2 public
    /// key `pub_key_hex`.
    pub async fn ecc_export_session_key(
        &self,
        con: Handle,
        alg_id: u32,
        pub_key_hex: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "ECCExportSessionKey",
                vec![json!(con.0), json!(alg_id), json!(pub_key_hex)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("ECCExportSessionKey", resp)
    }

    // ── Symmetric encryption ──────────────────────────────────────────────────

    /// Initializes an encryption run on a session key handle.
    pub async fn encrypt_init(
        &self,
        session_key: Handle,
        param_hex: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "EncryptInit",
                vec![json!(session_key.0), json!(param_hex)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("EncryptInit", resp)
    }

    /// One-shot encryption of `data_hex`.
    pub async fn encrypt(
        &self,
        session_key: Handle,
        data_hex: &str,
    ) -> Result<String, OperationError> {
        let resp = self
            .execute(
                "Encrypt",
                vec![json!(session_key.0), json!(data_hex)],
                ResponseRule::Blob,
            )
            .await?;
        expect_blob("Encrypt", resp)
    }

    /// Streaming encryption step; pair with
    /// [`encrypt_final`](Self::encrypt_final).
    pub async fn encrypt_update(
        &self,
        session_key: Handle,
        data_hex: &str,
    ) -> Result<String, OperationError> {
        let resp = self
            .execute(
                "EncryptUpdate",
                vec![json!(session_key.0), json!(data_hex)],
                ResponseRule::Blob,
            )
            .await?;
        expect_blob("EncryptUpdate", resp)
    }

    /// Finishes a streaming encryption run.
    pub async fn encrypt_final(&self, session_key: Handle) -> Result<(), OperationError> {
        let resp = self
            .execute("EncryptFinal", vec![json!(session_key.0)], ResponseRule::Status)
            .await?;
        expect_unit("EncryptFinal", resp)
    }

    // ── Digest ────────────────────────────────────────────────────────────────

    /// Starts a digest computation, returning the hash-context handle.
    ///
    /// For SM3-with-identity digests the signer's public key and id are
    /// required; pass empty strings otherwise.
    pub async fn digest_init(
        &self,
        dev: Handle,
        alg_id: u32,
        pub_key_hex: &str,
        signer_id: &str,
    ) -> Result<Handle, OperationError> {
        let resp = self
            .execute(
                "DigestInit",
                vec![
                    json!(dev.0),
                    json!(alg_id),
                    json!(pub_key_hex),
                    json!(signer_id),
                ],
                ResponseRule::Handle,
            )
            .await?;
        expect_handle("DigestInit", resp)
    }

    /// One-shot digest of `data_hex`.
    pub async fn digest(&self, hash: Handle, data_hex: &str) -> Result<String, OperationError> {
        let resp = self
            .execute(
                "Digest",
                vec![json!(hash.0), json!(data_hex)],
                ResponseRule::Blob,
            )
            .await?;
        expect_blob("Digest", resp)
    }

    /// Streaming digest step; pair with [`digest_final`](Self::digest_final).
    pub async fn digest_update(
        &self,
        hash: Handle,
        data_hex: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "DigestUpdate",
                vec![json!(hash.0), json!(data_hex)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("DigestUpdate", resp)
    }

    /// Finishes a streaming digest run and returns the digest as hex.
    pub async fn digest_final(&self, hash: Handle) -> Result<String, OperationError> {
        let resp = self
            .execute("DigestFinal", vec![json!(hash.0)], ResponseRule::Blob)
            .await?;
        expect_blob("DigestFinal", resp)
    }

    // ── Files ─────────────────────────────────────────────────────────────────

    pub async fn enum_file(&self, app: Handle) -> Result<Vec<String>, OperationError> {
        let resp = self
            .execute("EnumSKFile", vec![json!(app.0)], ResponseRule::NameList)
            .await?;
        expect_names("EnumSKFile", resp)
    }

    pub async fn create_file(
        &self,
        app: Handle,
        name: &str,
        size: u32,
        read_right: FileRight,
        write_right: FileRight,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "CreateSKFile",
                vec![
                    json!(app.0),
                    json!(name),
                    json!(size),
                    json!(read_right.word()),
                    json!(write_right.word()),
                ],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("CreateSKFile", resp)
    }

    pub async fn delete_file(&self, app: Handle, name: &str) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "DeleteSKFile",
                vec![json!(app.0), json!(name)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("DeleteSKFile", resp)
    }

    pub async fn get_file_info(&self, app: Handle, name: &str) -> Result<FileInfo, OperationError> {
        let resp = self
            .execute(
                "GetSKFileInfo",
                vec![json!(app.0), json!(name)],
                ResponseRule::FileInfo,
            )
            .await?;
        expect_file_info("GetSKFileInfo", resp)
    }

    /// Reads `length` bytes at `offset`, returned as hex.
    pub async fn read_file(
        &self,
        app: Handle,
        name: &str,
        offset: u32,
        length: u32,
    ) -> Result<String, OperationError> {
        let resp = self
            .execute(
                "ReadSKFile",
                vec![json!(app.0), json!(name), json!(offset), json!(length)],
                ResponseRule::Blob,
            )
            .await?;
        expect_blob("ReadSKFile", resp)
    }

    /// Writes `data_hex` at `offset`.
    pub async fn write_file(
        &self,
        app: Handle,
        name: &str,
        offset: u32,
        data_hex: &str,
    ) -> Result<(), OperationError> {
        let resp = self
            .execute(
                "WriteSKFile",
                vec![json!(app.0), json!(name), json!(offset), json!(data_hex)],
                ResponseRule::Status,
            )
            .await?;
        expect_unit("WriteSKFile", resp)
    }

    // ── Generic ───────────────────────────────────────────────────────────────

    /// Closes any handle (session key, hash context, ...).
    pub async fn close_handle(&self, handle: Handle) -> Result<(), OperationError> {
        let resp = self
            .execute("CloseHandle", vec![json!(handle.0)], ResponseRule::Status)
            .await?;
        expect_unit("CloseHandle", resp)
    }

    // ── Pipeline core ─────────────────────────────────────────────────────────

    /// The shared send → check `Result` → decode pipeline.
    ///
    /// `op` doubles as the command name on the wire and the operation label
    /// in error messages.
    async fn execute(
        &self,
        op: &'static str,
        params: Vec<Value>,
        rule: ResponseRule,
    ) -> Result<DecodedResponse, OperationError> {
        let method = format!("{op}|{}", self.config.control_class_id);
        let frame = self
            .session
            .request(&method, params)
            .await
            .map_err(|e| OperationError::Transport {
                op,
                detail: e.to_string(),
            })?;

        if !frame.succeeded {
            // The payload is whatever error text the peer chose to send,
            // not a decodable hex shape.
            return Err(OperationError::Transport {
                op,
                detail: frame.payload,
            });
        }

        decode_response(rule, &frame.payload).map_err(|e| OperationError::classify(op, e))
    }
}

// ── Payload extraction helpers ────────────────────────────────────────────────
//
// decode_response returns the variant its rule produces, so a mismatch can
// only mean a façade bug; it is still surfaced as a decode failure rather
// than a panic.

fn shape_error(op: &'static str, got: &DecodedResponse) -> OperationError {
    OperationError::Decode {
        op,
        detail: format!("unexpected response shape: {got:?}"),
    }
}

fn expect_unit(op: &'static str, resp: DecodedResponse) -> Result<(), OperationError> {
    match resp {
        DecodedResponse::Unit => Ok(()),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_handle(op: &'static str, resp: DecodedResponse) -> Result<Handle, OperationError> {
    match resp {
        DecodedResponse::Handle(h) => Ok(h),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_names(op: &'static str, resp: DecodedResponse) -> Result<Vec<String>, OperationError> {
    match resp {
        DecodedResponse::Names(names) => Ok(names),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_blob(op: &'static str, resp: DecodedResponse) -> Result<String, OperationError> {
    match resp {
        DecodedResponse::Blob(blob) => Ok(blob),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_container_type(
    op: &'static str,
    resp: DecodedResponse,
) -> Result<ContainerType, OperationError> {
    match resp {
        DecodedResponse::ContainerType(t) => Ok(t),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_device_info(op: &'static str, resp: DecodedResponse) -> Result<DeviceInfo, OperationError> {
    match resp {
        DecodedResponse::DeviceInfo(info) => Ok(info),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_rsa_key(op: &'static str, resp: DecodedResponse) -> Result<RsaPublicKey, OperationError> {
    match resp {
        DecodedResponse::RsaKeyPair(key) => Ok(key),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_ecc_key(op: &'static str, resp: DecodedResponse) -> Result<EccPublicKey, OperationError> {
    match resp {
        DecodedResponse::EccKeyPair(key) => Ok(key),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_ecc_signature(
    op: &'static str,
    resp: DecodedResponse,
) -> Result<EccSignature, OperationError> {
    match resp {
        DecodedResponse::EccSignature(sig) => Ok(sig),
        other => Err(shape_error(op, &other)),
    }
}

fn expect_file_info(op: &'static str, resp: DecodedResponse) -> Result<FileInfo, OperationError> {
    match resp {
        DecodedResponse::FileInfo(info) => Ok(info),
        other => Err(shape_error(op, &other)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
//
// The full send/receive path is exercised against a real in-process peer
// in tests/operations_integration.rs; these tests cover the pure
// classification and extraction logic.
