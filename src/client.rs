//! Capability interfaces the caller plugs into the handshake driver.
//!
//! The driver never implements cipher suites, key exchange, signing or
//! certificate validation itself; it sequences the protocol and calls out
//! through these traits. The set of operations is small and closed,
//! mirroring what the handshake actually needs.

use zeroize::Zeroizing;

use crate::message::{
    Certificate, CertificateRequest, CipherSuite, CompressionMethod, ExtensionTable,
    ProtocolVersion, Random, SupplementalDataEntry,
};
use crate::Error;

/// The security parameters negotiated over one handshake.
///
/// Fields are assigned in protocol order: `client_random` exists from the
/// start, `server_random` after ServerHello, `master_secret` after the
/// client key exchange. The master secret is zeroized when the parameters
/// are dropped.
pub struct SecurityParameters {
    client_random: Random,
    server_random: Option<Random>,
    master_secret: Option<Zeroizing<[u8; 48]>>,
}

impl SecurityParameters {
    pub(crate) fn new(client_random: Random) -> Self {
        SecurityParameters {
            client_random,
            server_random: None,
            master_secret: None,
        }
    }

    /// The 32-byte client hello random.
    pub fn client_random(&self) -> &[u8] {
        &self.client_random
    }

    /// The 32-byte server hello random, once ServerHello has been
    /// processed.
    pub fn server_random(&self) -> Option<&[u8]> {
        self.server_random.as_deref()
    }

    /// The 48-byte master secret, once derived.
    pub fn master_secret(&self) -> Option<&[u8]> {
        self.master_secret.as_deref().map(|m| m.as_slice())
    }

    pub(crate) fn set_server_random(&mut self, server_random: Random) {
        self.server_random = Some(server_random);
    }

    pub(crate) fn set_master_secret(&mut self, master_secret: [u8; 48]) {
        self.master_secret = Some(Zeroizing::new(master_secret));
    }
}

/// Read-only view of the evolving handshake context, handed to the client
/// capability and the key exchange.
pub struct TlsContext {
    client_version: ProtocolVersion,
    server_version: Option<ProtocolVersion>,
    security_parameters: SecurityParameters,
}

impl TlsContext {
    pub(crate) fn new(client_version: ProtocolVersion, client_random: Random) -> Self {
        TlsContext {
            client_version,
            server_version: None,
            security_parameters: SecurityParameters::new(client_random),
        }
    }

    /// The version the client offered.
    pub fn client_version(&self) -> ProtocolVersion {
        self.client_version
    }

    /// The version the server committed to, once discovered from the
    /// first inbound record.
    pub fn server_version(&self) -> Option<ProtocolVersion> {
        self.server_version
    }

    /// The negotiated security parameters.
    pub fn security_parameters(&self) -> &SecurityParameters {
        &self.security_parameters
    }

    pub(crate) fn set_server_version(&mut self, server_version: ProtocolVersion) {
        self.server_version = Some(server_version);
    }

    pub(crate) fn security_parameters_mut(&mut self) -> &mut SecurityParameters {
        &mut self.security_parameters
    }
}

/// The client capability driving policy decisions for one handshake.
///
/// Implementations choose versions, suites and extensions, observe what
/// the server selected, and manufacture the key-exchange, authentication
/// and cipher objects for the negotiated parameters.
pub trait TlsClient {
    /// The pending cipher state this client builds for the record layer.
    /// The driver passes it through untouched.
    type Cipher;

    /// Called once before the first ClientHello with the freshly created
    /// context (client_random is already populated).
    fn init(&mut self, context: &TlsContext);

    /// The protocol version to offer. Must be a DTLS version.
    fn client_version(&self) -> ProtocolVersion;

    /// The cipher suites to offer, in preference order, without the SCSV
    /// (the driver appends it when appropriate).
    fn cipher_suites(&self) -> Vec<CipherSuite>;

    /// The compression methods to offer. Only `Null` is meaningful; there
    /// is no compression negotiation.
    fn compression_methods(&self) -> Vec<CompressionMethod> {
        vec![CompressionMethod::Null]
    }

    /// The extension table for the ClientHello. Emitted in insertion
    /// order; an empty table suppresses the extension block entirely.
    fn client_extensions(&mut self) -> ExtensionTable {
        ExtensionTable::new()
    }

    /// The server's record-layer version, discovered from its first
    /// record.
    fn notify_server_version(&mut self, server_version: ProtocolVersion) -> Result<(), Error> {
        let _ = server_version;
        Ok(())
    }

    /// The session id the server assigned (possibly empty).
    fn notify_session_id(&mut self, session_id: &[u8]) {
        let _ = session_id;
    }

    /// The cipher suite the server selected from our offer.
    fn notify_selected_cipher_suite(&mut self, cipher_suite: CipherSuite) {
        let _ = cipher_suite;
    }

    /// The compression method the server selected from our offer.
    fn notify_selected_compression_method(&mut self, compression_method: CompressionMethod) {
        let _ = compression_method;
    }

    /// Whether the server acknowledged secure renegotiation (RFC 5746).
    fn notify_secure_renegotiation(&mut self, secure: bool) -> Result<(), Error> {
        let _ = secure;
        Ok(())
    }

    /// The server's extension table, invoked only when the client offered
    /// extensions of its own. `None` means the ServerHello carried no
    /// extension block.
    fn process_server_extensions(&mut self, extensions: Option<&ExtensionTable>) -> Result<(), Error> {
        let _ = extensions;
        Ok(())
    }

    /// Supplemental data to send after ServerHelloDone; `None` or an
    /// empty vector means the message is skipped.
    fn client_supplemental_data(&mut self) -> Result<Option<Vec<SupplementalDataEntry>>, Error> {
        Ok(None)
    }

    /// The server's supplemental data, or `None` when the server sent no
    /// such message.
    fn process_server_supplemental_data(
        &mut self,
        entries: Option<Vec<SupplementalDataEntry>>,
    ) -> Result<(), Error> {
        let _ = entries;
        Ok(())
    }

    /// Manufacture the key exchange for the cipher suite the server
    /// selected. Called once, after ServerHello.
    fn key_exchange(&mut self) -> Result<Box<dyn TlsKeyExchange>, Error>;

    /// The authentication capability, if this client can evaluate server
    /// certificates (and potentially supply its own).
    fn authentication(&mut self) -> Option<Box<dyn TlsAuthentication>>;

    /// Build the pending cipher state from the negotiated suite and the
    /// derived master secret (available through `context`).
    fn cipher(&mut self, context: &TlsContext) -> Result<Self::Cipher, Error>;
}

/// Key exchange for one handshake, created after ServerHello selected a
/// cipher suite.
///
/// The driver calls exactly one of each skip/process pair, in protocol
/// order: server certificate, server key exchange, client credentials.
pub trait TlsKeyExchange {
    /// Bind the key exchange to the handshake context.
    fn init(&mut self, context: &TlsContext) -> Result<(), Error>;

    /// The server sent no Certificate message.
    fn skip_server_certificate(&mut self) -> Result<(), Error>;

    /// The server's certificate chain. An empty chain is accepted or
    /// rejected here, depending on what the key exchange permits.
    fn process_server_certificate(&mut self, certificate: &Certificate) -> Result<(), Error>;

    /// The server sent no ServerKeyExchange message.
    fn skip_server_key_exchange(&mut self) -> Result<(), Error>;

    /// The ServerKeyExchange body. Returns the unconsumed remainder; the
    /// driver fails the handshake if any bytes are left over.
    fn process_server_key_exchange<'a>(&mut self, input: &'a [u8]) -> Result<&'a [u8], Error>;

    /// Check a CertificateRequest is compatible with this key exchange.
    fn validate_certificate_request(&self, request: &CertificateRequest) -> Result<(), Error>;

    /// No client credentials are available for this handshake.
    fn skip_client_credentials(&mut self) -> Result<(), Error>;

    /// The credentials the client will present.
    fn process_client_credentials(&mut self, credentials: &dyn TlsCredentials)
        -> Result<(), Error>;

    /// Write the ClientKeyExchange body.
    fn generate_client_key_exchange(&mut self, output: &mut Vec<u8>) -> Result<(), Error>;

    /// Produce the premaster secret. The driver zeroizes the buffer as
    /// soon as the master secret is derived, on every path.
    fn generate_premaster_secret(&mut self) -> Result<Zeroizing<Vec<u8>>, Error>;
}

/// Server authentication and client credential selection.
pub trait TlsAuthentication {
    /// The server's certificate chain, for validation per the
    /// application's policy.
    fn notify_server_certificate(&mut self, certificate: &Certificate) -> Result<(), Error>;

    /// Pick credentials matching the server's CertificateRequest, or
    /// `None` to answer with an empty chain.
    fn client_credentials(
        &mut self,
        request: &CertificateRequest,
    ) -> Result<Option<Box<dyn TlsCredentials>>, Error>;
}

/// Client credentials: a certificate chain, optionally able to sign.
pub trait TlsCredentials {
    /// The certificate chain to present.
    fn certificate(&self) -> &Certificate;

    /// Downcast to signing credentials. Credentials that cannot sign
    /// (e.g. fixed-DH) return `None` and no CertificateVerify is sent.
    fn as_signer(&mut self) -> Option<&mut dyn TlsSignerCredentials> {
        None
    }
}

/// Credentials that sign the handshake transcript for CertificateVerify.
pub trait TlsSignerCredentials: TlsCredentials {
    /// Sign the transcript hash (MD5 ‖ SHA-1 for pre-1.2 versions).
    fn generate_certificate_signature(&mut self, transcript_hash: &[u8]) -> Result<Vec<u8>, Error>;
}
