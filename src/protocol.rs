//! The client handshake driver.
//!
//! One call to [`DtlsClientProtocol::connect`] drives a full DTLS 1.0
//! client handshake to completion or failure:
//!
//! ```text
//! Client                                               Server
//!
//! 1     ClientHello                  -------->
//! 2                                  <--------   HelloVerifyRequest
//!                                                 (contains cookie)
//! 3     ClientHello                  -------->
//!       (with cookie)
//! 4                                                     ServerHello
//!                                                SupplementalData*
//!                                                      Certificate*
//!                                                ServerKeyExchange*
//!                                               CertificateRequest*
//!                                    <--------      ServerHelloDone
//! 5     SupplementalData*
//!       Certificate*
//!       ClientKeyExchange
//!       CertificateVerify*
//!       Finished                     -------->
//! 6                                  <--------             Finished
//! ```
//!
//! The suspension points are exactly the `receive_message` calls on the
//! reliable layer; retransmission and fragmentation happen below us.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use smallvec::SmallVec;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::alert::AlertLevel;
use crate::client::{TlsAuthentication, TlsClient, TlsContext, TlsCredentials, TlsKeyExchange};
use crate::codec::assert_empty;
use crate::handshake::{HandshakeMessage, RecordLayer, ReliableHandshake};
use crate::message::{
    create_renegotiation_info, patch_client_hello_with_cookie, Certificate, CertificateRequest,
    CertificateVerify, CipherSuite, ClientHello, CompressionMethod, Cookie, ExtensionTable,
    ExtensionType, Finished, HandshakeType, HelloVerifyRequest, Random, ServerHello, SessionId,
    SupplementalDataEntry,
};
use crate::prf;
use crate::rng::SeededRng;
use crate::Error;

/// The secured transport returned by a successful handshake. Owns the
/// record layer with the negotiated epoch committed.
pub struct DtlsTransport<R> {
    record_layer: R,
}

impl<R: RecordLayer> DtlsTransport<R> {
    fn new(record_layer: R) -> Self {
        DtlsTransport { record_layer }
    }

    /// Borrow the record layer.
    pub fn record_layer(&self) -> &R {
        &self.record_layer
    }

    /// Borrow the record layer mutably.
    pub fn record_layer_mut(&mut self) -> &mut R {
        &mut self.record_layer
    }

    /// Unwrap into the record layer.
    pub fn into_record_layer(self) -> R {
        self.record_layer
    }
}

impl<R> fmt::Debug for DtlsTransport<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DtlsTransport").finish_non_exhaustive()
    }
}

/// Everything the driver accumulates over one handshake. Dropped on
/// completion or failure; nothing is shared between handshakes.
struct ClientHandshakeState {
    context: TlsContext,
    offered_cipher_suites: Vec<CipherSuite>,
    offered_compression_methods: Vec<CompressionMethod>,
    client_extensions: ExtensionTable,
    secure_renegotiation: bool,
    key_exchange: Option<Box<dyn TlsKeyExchange>>,
    authentication: Option<Box<dyn TlsAuthentication>>,
    certificate_request: Option<CertificateRequest>,
    client_credentials: Option<Box<dyn TlsCredentials>>,
}

impl ClientHandshakeState {
    fn new(context: TlsContext) -> Self {
        ClientHandshakeState {
            context,
            offered_cipher_suites: Vec::new(),
            offered_compression_methods: Vec::new(),
            client_extensions: ExtensionTable::new(),
            secure_renegotiation: false,
            key_exchange: None,
            authentication: None,
            certificate_request: None,
            client_credentials: None,
        }
    }

    fn key_exchange_mut(&mut self) -> Result<&mut (dyn TlsKeyExchange + '_), Error> {
        match self.key_exchange.as_mut() {
            Some(ke) => Ok(ke.as_mut()),
            None => Err(Error::InternalError("key exchange not initialized".to_string())),
        }
    }
}

/// Drives client-side DTLS handshakes.
///
/// The RNG is injected at construction and used only for the client
/// random; key-exchange implementations bring their own randomness.
pub struct DtlsClientProtocol {
    rng: SeededRng,
}

impl DtlsClientProtocol {
    /// Create a driver with the given randomness source.
    pub fn new(rng: SeededRng) -> Self {
        DtlsClientProtocol { rng }
    }

    /// Run one handshake: connect `client` to the peer behind `handshake`,
    /// returning the secured transport.
    ///
    /// On any failure a fatal alert with the matching description is
    /// emitted on the record layer before the error is returned; no
    /// partial transport ever escapes.
    pub fn connect<C, H>(
        &mut self,
        mut client: C,
        mut handshake: H,
    ) -> Result<DtlsTransport<H::Record>, Error>
    where
        C: TlsClient,
        H: ReliableHandshake,
        H::Record: RecordLayer<Cipher = C::Cipher>,
    {
        match self.connect_inner(&mut client, &mut handshake) {
            Ok(()) => {
                let mut record_layer = handshake.finish();
                record_layer.handshake_successful();
                debug!("Handshake complete");
                Ok(DtlsTransport::new(record_layer))
            }
            Err(error) => {
                warn!("Handshake failed: {}", error);
                handshake
                    .record_layer_mut()
                    .send_alert(AlertLevel::Fatal, error.alert_description());
                Err(error)
            }
        }
    }

    fn connect_inner<C, H>(&mut self, client: &mut C, handshake: &mut H) -> Result<(), Error>
    where
        C: TlsClient,
        H: ReliableHandshake,
        H::Record: RecordLayer<Cipher = C::Cipher>,
    {
        let client_version = client.client_version();
        if !client_version.is_dtls() {
            return Err(Error::InternalError(format!(
                "client version {:04x} is not a DTLS version",
                client_version.as_u16()
            )));
        }

        let client_random = Random::generate(unix_time(), &mut self.rng);
        let mut state = ClientHandshakeState::new(TlsContext::new(client_version, client_random));
        client.init(&state.context);

        let mut client_hello_body =
            self.generate_client_hello(client, &mut state, client_random)?;
        debug!("Sending ClientHello ({} bytes)", client_hello_body.len());
        handshake.send_message(HandshakeType::ClientHello, &client_hello_body)?;

        let mut server_message = handshake.receive_message()?;

        {
            // The first record from the server fixes the negotiated
            // record-layer version for the rest of the handshake.
            let server_version = handshake
                .record_layer_mut()
                .discovered_peer_version()
                .ok_or_else(|| {
                    Error::InternalError(
                        "record layer has not discovered the peer version".to_string(),
                    )
                })?;

            if !server_version.is_equal_or_earlier_version_of(client_version) {
                return Err(Error::IllegalParameter(format!(
                    "server version {:04x} is later than offered {:04x}",
                    server_version.as_u16(),
                    client_version.as_u16()
                )));
            }

            state.context.set_server_version(server_version);
            client.notify_server_version(server_version)?;
        }

        while server_message.msg_type == HandshakeType::HelloVerifyRequest {
            let cookie = parse_hello_verify_request(&state, &server_message.body)?;
            debug!("HelloVerifyRequest with {} byte cookie", cookie.len());

            client_hello_body = patch_client_hello_with_cookie(&client_hello_body, &cookie)?;

            // Only the post-cookie ClientHello may contribute to the
            // transcript.
            handshake.reset_transcript();
            handshake.send_message(HandshakeType::ClientHello, &client_hello_body)?;

            server_message = handshake.receive_message()?;
        }

        expect_type(&server_message, HandshakeType::ServerHello)?;
        self.process_server_hello(client, &mut state, &server_message.body)?;
        server_message = handshake.receive_message()?;

        if server_message.msg_type == HandshakeType::SupplementalData {
            let (rest, entries) = SupplementalDataEntry::parse_message(&server_message.body)?;
            assert_empty(rest)?;
            client.process_server_supplemental_data(Some(entries))?;
            server_message = handshake.receive_message()?;
        } else {
            client.process_server_supplemental_data(None)?;
        }

        if server_message.msg_type == HandshakeType::Certificate {
            self.process_server_certificate(client, &mut state, &server_message.body)?;
            server_message = handshake.receive_message()?;
        } else {
            // Okay, Certificate is optional
            state.key_exchange_mut()?.skip_server_certificate()?;
        }

        if server_message.msg_type == HandshakeType::ServerKeyExchange {
            let rest = state
                .key_exchange_mut()?
                .process_server_key_exchange(&server_message.body)?;
            assert_empty(rest)?;
            server_message = handshake.receive_message()?;
        } else {
            // Okay, ServerKeyExchange is optional
            state.key_exchange_mut()?.skip_server_key_exchange()?;
        }

        if server_message.msg_type == HandshakeType::CertificateRequest {
            self.process_certificate_request(&mut state, &server_message.body)?;
            server_message = handshake.receive_message()?;
        }

        expect_type(&server_message, HandshakeType::ServerHelloDone)?;
        if !server_message.body.is_empty() {
            return Err(Error::UnexpectedMessage(
                "ServerHelloDone with non-empty body".to_string(),
            ));
        }

        if let Some(entries) = client.client_supplemental_data()? {
            if !entries.is_empty() {
                let mut body = Vec::new();
                SupplementalDataEntry::serialize_message(&entries, &mut body);
                handshake.send_message(HandshakeType::SupplementalData, &body)?;
            }
        }

        if let Some(request) = &state.certificate_request {
            let authentication = state.authentication.as_deref_mut().ok_or_else(|| {
                Error::InternalError(
                    "certificate request retained without authentication".to_string(),
                )
            })?;
            state.client_credentials = authentication.client_credentials(request)?;

            let chain = match &state.client_credentials {
                Some(credentials) => credentials.certificate().clone(),
                None => Certificate::empty(),
            };

            let mut body = Vec::new();
            chain.serialize(&mut body);
            debug!(
                "Sending client Certificate ({} certs)",
                chain.certificate_list.len()
            );
            handshake.send_message(HandshakeType::Certificate, &body)?;
        }

        match &state.client_credentials {
            Some(credentials) => {
                state
                    .key_exchange
                    .as_deref_mut()
                    .ok_or_else(|| {
                        Error::InternalError("key exchange not initialized".to_string())
                    })?
                    .process_client_credentials(&**credentials)?;
            }
            None => state.key_exchange_mut()?.skip_client_credentials()?,
        }

        let mut client_key_exchange_body = Vec::new();
        state
            .key_exchange_mut()?
            .generate_client_key_exchange(&mut client_key_exchange_body)?;
        debug!(
            "Sending ClientKeyExchange ({} bytes)",
            client_key_exchange_body.len()
        );
        handshake.send_message(HandshakeType::ClientKeyExchange, &client_key_exchange_body)?;

        self.establish_master_secret(&mut state)?;

        if let Some(credentials) = state.client_credentials.as_deref_mut() {
            if let Some(signer) = credentials.as_signer() {
                // Signed over the transcript as it stands right now,
                // before our Finished: MD5 ‖ SHA-1 for pre-1.2.
                let transcript_hash = handshake.current_hash();
                let signature = signer.generate_certificate_signature(&transcript_hash)?;

                let mut body = Vec::new();
                CertificateVerify::new(signature).serialize(&mut body);
                debug!("Sending CertificateVerify");
                handshake.send_message(HandshakeType::CertificateVerify, &body)?;
            }
        }

        let cipher = client.cipher(&state.context)?;
        handshake.record_layer_mut().init_pending_epoch(cipher);

        let client_verify_data = prf::calculate_verify_data(
            master_secret(&state)?,
            "client finished",
            &handshake.current_hash(),
        );
        debug!("Sending Finished");
        handshake.send_message(HandshakeType::Finished, &client_verify_data)?;

        // Calculated exclusive of the actual Finished message from the
        // server; our own Finished is already in the transcript.
        let expected_server_verify_data = prf::calculate_verify_data(
            master_secret(&state)?,
            "server finished",
            &handshake.current_hash(),
        );

        let server_message = handshake.receive_message()?;
        expect_type(&server_message, HandshakeType::Finished)?;
        process_finished(&server_message.body, &expected_server_verify_data)?;

        Ok(())
    }

    fn generate_client_hello<C: TlsClient>(
        &mut self,
        client: &mut C,
        state: &mut ClientHandshakeState,
        client_random: Random,
    ) -> Result<Vec<u8>, Error> {
        state.offered_cipher_suites = client.cipher_suites();
        state.offered_compression_methods = client.compression_methods();
        state.client_extensions = client.client_extensions();

        // RFC 5746 3.4: include either an empty renegotiation_info
        // extension or the SCSV, never both.
        let no_renegotiation_ext = !state
            .client_extensions
            .contains(ExtensionType::RenegotiationInfo);

        let mut wire_suites: SmallVec<[CipherSuite; 32]> =
            state.offered_cipher_suites.iter().copied().collect();
        if no_renegotiation_ext {
            wire_suites.push(CipherSuite::EMPTY_RENEGOTIATION_INFO_SCSV);
        }

        let client_hello = ClientHello::new(
            state.context.client_version(),
            client_random,
            SessionId::empty(),
            Cookie::empty(),
            wire_suites,
            state.offered_compression_methods.iter().copied().collect(),
            state.client_extensions.clone(),
        );

        let mut body = Vec::new();
        client_hello.serialize(&mut body)?;
        Ok(body)
    }

    fn process_server_hello<C: TlsClient>(
        &mut self,
        client: &mut C,
        state: &mut ClientHandshakeState,
        body: &[u8],
    ) -> Result<(), Error> {
        let (rest, server_hello) = ServerHello::parse(body)?;
        assert_empty(rest)?;

        let ServerHello {
            server_version,
            random,
            session_id,
            cipher_suite,
            compression_method,
            extensions,
        } = server_hello;

        if Some(server_version) != state.context.server_version() {
            return Err(Error::DecodeError(format!(
                "ServerHello version {:04x} does not match negotiated version",
                server_version.as_u16()
            )));
        }

        state
            .context
            .security_parameters_mut()
            .set_server_random(random);

        client.notify_session_id(&session_id);

        if cipher_suite == CipherSuite::EMPTY_RENEGOTIATION_INFO_SCSV
            || !state.offered_cipher_suites.contains(&cipher_suite)
        {
            return Err(Error::IllegalParameter(format!(
                "server selected cipher suite {:04x} which was not offered",
                cipher_suite.as_u16()
            )));
        }
        client.notify_selected_cipher_suite(cipher_suite);

        if !state
            .offered_compression_methods
            .contains(&compression_method)
        {
            return Err(Error::IllegalParameter(format!(
                "server selected compression method {:02x} which was not offered",
                compression_method.as_u8()
            )));
        }
        client.notify_selected_compression_method(compression_method);

        if let Some(server_extensions) = &extensions {
            for (extension_type, _) in server_extensions.iter() {
                // RFC 3546 2.3: a type may only appear in the ServerHello
                // if we asked for it. renegotiation_info is the RFC 5746
                // exception since the SCSV already signaled our support.
                if extension_type != ExtensionType::RenegotiationInfo
                    && !state.client_extensions.contains(extension_type)
                {
                    return Err(Error::UnsupportedExtension(format!(
                        "server returned unsolicited extension {:04x}",
                        extension_type.as_u16()
                    )));
                }
            }

            // RFC 5746 3.4, client behavior for the initial handshake: a
            // present renegotiation_info must carry an empty
            // renegotiated_connection.
            if let Some(payload) = server_extensions.get(ExtensionType::RenegotiationInfo) {
                state.secure_renegotiation = true;

                let expected = create_renegotiation_info(&[]);
                let matches: bool = payload.ct_eq(&expected).into();
                if !matches {
                    return Err(Error::HandshakeFailure(
                        "renegotiation_info carried a non-empty renegotiated_connection"
                            .to_string(),
                    ));
                }
            }
        }

        client.notify_secure_renegotiation(state.secure_renegotiation)?;

        if !state.client_extensions.is_empty() {
            client.process_server_extensions(extensions.as_ref())?;
        }

        let mut key_exchange = client.key_exchange()?;
        key_exchange.init(&state.context)?;
        state.key_exchange = Some(key_exchange);

        trace!(
            "ServerHello processed: suite {:04x}, secure_renegotiation {}",
            cipher_suite.as_u16(),
            state.secure_renegotiation
        );

        Ok(())
    }

    fn process_server_certificate<C: TlsClient>(
        &mut self,
        client: &mut C,
        state: &mut ClientHandshakeState,
        body: &[u8],
    ) -> Result<(), Error> {
        let (rest, server_certificate) = Certificate::parse(body)?;
        assert_empty(rest)?;

        // The key exchange decides whether an empty chain is acceptable.
        state
            .key_exchange_mut()?
            .process_server_certificate(&server_certificate)?;

        let mut authentication = client.authentication().ok_or_else(|| {
            Error::InternalError(
                "server sent a certificate but the client has no authentication capability"
                    .to_string(),
            )
        })?;
        authentication.notify_server_certificate(&server_certificate)?;
        state.authentication = Some(authentication);

        Ok(())
    }

    fn process_certificate_request(
        &mut self,
        state: &mut ClientHandshakeState,
        body: &[u8],
    ) -> Result<(), Error> {
        // Only legal when client authentication is possible at all.
        if state.authentication.is_none() {
            return Err(Error::UnexpectedMessage(
                "CertificateRequest without an authentication capability".to_string(),
            ));
        }

        let (rest, request) = CertificateRequest::parse(body)?;
        assert_empty(rest)?;

        state
            .key_exchange
            .as_deref()
            .ok_or_else(|| Error::InternalError("key exchange not initialized".to_string()))?
            .validate_certificate_request(&request)?;

        state.certificate_request = Some(request);
        Ok(())
    }

    fn establish_master_secret(&mut self, state: &mut ClientHandshakeState) -> Result<(), Error> {
        let mut premaster: Zeroizing<Vec<u8>> =
            state.key_exchange_mut()?.generate_premaster_secret()?;

        let (client_random, server_random) = {
            let params = state.context.security_parameters();
            let server_random = params
                .server_random()
                .ok_or_else(|| Error::InternalError("server random not set".to_string()))?;
            (params.client_random().to_vec(), server_random.to_vec())
        };

        // The premaster is wiped inside the derivation; the Zeroizing
        // wrapper additionally catches panic paths.
        let master = prf::master_secret_from_premaster(
            premaster.as_mut_slice(),
            &client_random,
            &server_random,
        );
        state
            .context
            .security_parameters_mut()
            .set_master_secret(master);

        Ok(())
    }
}

fn parse_hello_verify_request(state: &ClientHandshakeState, body: &[u8]) -> Result<Cookie, Error> {
    let (rest, hello_verify) = HelloVerifyRequest::parse(body)?;
    assert_empty(rest)?;

    if Some(hello_verify.server_version) != state.context.server_version() {
        return Err(Error::DecodeError(format!(
            "HelloVerifyRequest version {:04x} does not match negotiated version",
            hello_verify.server_version.as_u16()
        )));
    }

    Ok(hello_verify.cookie)
}

fn process_finished(body: &[u8], expected_verify_data: &[u8; 12]) -> Result<(), Error> {
    let (rest, finished) = Finished::parse(body)?;
    assert_empty(rest)?;

    let matches: bool = finished.verify_data.ct_eq(expected_verify_data).into();
    if !matches {
        return Err(Error::HandshakeFailure(
            "server Finished verify_data mismatch".to_string(),
        ));
    }

    trace!("Server Finished verified");
    Ok(())
}

fn expect_type(message: &HandshakeMessage, expected: HandshakeType) -> Result<(), Error> {
    if message.msg_type == expected {
        Ok(())
    } else {
        Err(Error::UnexpectedMessage(format!(
            "expected {:?}, got {:?}",
            expected, message.msg_type
        )))
    }
}

fn master_secret(state: &ClientHandshakeState) -> Result<&[u8], Error> {
    state
        .context
        .security_parameters()
        .master_secret()
        .ok_or_else(|| Error::InternalError("master secret not derived".to_string()))
}

fn unix_time() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
