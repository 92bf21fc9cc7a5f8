//! Client handshake scenarios driven through scripted server mocks.


use handshake_common::*;

use dshake::message::{
    ClientHello, CipherSuite, Cookie, ExtensionTable, ExtensionType, HandshakeType,
    HelloVerifyRequest, ProtocolVersion, SupplementalDataEntry,
};
use dshake::{AlertDescription, AlertLevel, Error};

#[test]
fn happy_path_no_cookie() {
    let _ = env_logger::try_init();

    let client = MockClient::new();
    let events = client.events.clone();
    let kx_calls = client.kx_calls.clone();

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, basic_server_flight());
    let sent = handshake.sent.clone();

    let transport = new_protocol().connect(client, handshake).expect("handshake");

    let record = transport.into_record_layer();
    assert!(record.success, "record layer must be told of success");

    let pending = record.pending_epoch.expect("pending epoch installed");
    assert_eq!(pending.suite, CipherSuite::RSA_AES128_CBC_SHA);
    assert_eq!(pending.master_secret.len(), 48);

    let sent = sent.lock().unwrap();
    let types: Vec<HandshakeType> = sent.iter().map(|(t, _)| *t).collect();
    assert_eq!(
        types,
        vec![
            HandshakeType::ClientHello,
            HandshakeType::ClientKeyExchange,
            HandshakeType::Finished,
        ]
    );

    // Finished carries exactly the 12-byte verify_data.
    assert_eq!(sent[2].1.len(), 12);

    let kx_calls = kx_calls.lock().unwrap();
    assert_eq!(
        &*kx_calls,
        &[
            "init",
            "process_server_certificate",
            "skip_server_key_exchange",
            "skip_client_credentials",
            "generate_client_key_exchange",
            "generate_premaster_secret",
        ]
    );

    let events = events.lock().unwrap();
    assert!(events.contains(&"server_version:feff".to_string()));
    assert!(events.contains(&"session_id:1".to_string()));
    assert!(events.contains(&"cipher_suite:002f".to_string()));
    assert!(events.contains(&"compression:00".to_string()));
    assert!(events.contains(&"secure_renegotiation:false".to_string()));
    assert!(events.contains(&"server_certificate:1".to_string()));
    assert!(events.contains(&"server_supplemental:none".to_string()));
}

#[test]
fn client_hello_carries_scsv_without_renegotiation_extension() {
    let client = MockClient::new();

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, basic_server_flight());
    let sent = handshake.sent.clone();

    new_protocol().connect(client, handshake).expect("handshake");

    let sent = sent.lock().unwrap();
    let (_, hello) = ClientHello::parse(&sent[0].1).expect("parse ClientHello");

    assert!(hello
        .cipher_suites
        .contains(&CipherSuite::EMPTY_RENEGOTIATION_INFO_SCSV));
    assert_eq!(
        hello.cipher_suites.last(),
        Some(&CipherSuite::EMPTY_RENEGOTIATION_INFO_SCSV),
        "SCSV is appended after the offered suites"
    );
    assert!(hello.session_id.is_empty());
    assert!(hello.cookie.is_empty());
}

#[test]
fn client_hello_omits_scsv_when_renegotiation_extension_offered() {
    let mut client = MockClient::new();
    client
        .extensions
        .insert(ExtensionType::RenegotiationInfo, vec![0x00]);

    let mut extensions = ExtensionTable::new();
    extensions.insert(ExtensionType::RenegotiationInfo, vec![0x00]);
    let script = vec![
        ScriptItem::Message(
            HandshakeType::ServerHello,
            server_hello_body(Some(extensions)),
        ),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::ServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);
    let sent = handshake.sent.clone();

    new_protocol().connect(client, handshake).expect("handshake");

    let sent = sent.lock().unwrap();
    let (_, hello) = ClientHello::parse(&sent[0].1).expect("parse ClientHello");

    assert!(!hello
        .cipher_suites
        .contains(&CipherSuite::EMPTY_RENEGOTIATION_INFO_SCSV));
    assert!(hello.extensions.contains(ExtensionType::RenegotiationInfo));
}

#[test]
fn cookie_roundtrip() {
    let _ = env_logger::try_init();

    let client = MockClient::new();

    let mut hvr_body = Vec::new();
    HelloVerifyRequest::new(
        ProtocolVersion::DTLS1_0,
        Cookie::try_new(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap(),
    )
    .serialize(&mut hvr_body);

    let mut script = vec![ScriptItem::Message(
        HandshakeType::HelloVerifyRequest,
        hvr_body,
    )];
    script.extend(basic_server_flight());

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);
    let sent = handshake.sent.clone();
    let resets = handshake.resets.clone();

    new_protocol().connect(client, handshake).expect("handshake");

    assert_eq!(*resets.lock().unwrap(), 1, "one transcript reset per retry");

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].0, HandshakeType::ClientHello);
    assert_eq!(sent[1].0, HandshakeType::ClientHello);

    let first = &sent[0].1;
    let second = &sent[1].1;

    // Cookie spliced at offset 35 (empty session id), new length byte 0x04.
    assert_eq!(second.len(), first.len() + 4);
    assert_eq!(second[35], 0x04);
    assert_eq!(&second[36..40], &[0xDE, 0xAD, 0xBE, 0xEF]);

    // Identical outside the cookie region, random included.
    assert_eq!(&second[..35], &first[..35]);
    assert_eq!(&second[40..], &first[36..]);
}

#[test]
fn server_version_later_than_offered_is_fatal() {
    let mut client = MockClient::new();
    client.version = ProtocolVersion::DTLS1_2;

    // DTLS 1.3 on the record layer: later than what we offered.
    let mut record = MockRecordLayer::new(ProtocolVersion::DTLS1_2);
    record.peer_version = Some(ProtocolVersion::from_u16(0xFEFC));
    let alerts = record.alerts.clone();

    let script = vec![ScriptItem::Message(
        HandshakeType::ServerHello,
        server_hello_body(None),
    )];
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::IllegalParameter(_)), "{:?}", error);

    let alerts = alerts.lock().unwrap();
    assert_eq!(
        &*alerts,
        &[(AlertLevel::Fatal, AlertDescription::IllegalParameter)]
    );
}

#[test]
fn rc4_suite_is_refused_before_any_send() {
    let mut client = MockClient::new();
    client.suites = vec![
        CipherSuite::RSA_AES128_CBC_SHA,
        CipherSuite::RSA_RC4_128_SHA,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, Vec::new());
    let sent = handshake.sent.clone();

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::InvalidArgument(_)), "{:?}", error);
    assert!(sent.lock().unwrap().is_empty(), "nothing may reach the wire");
}

#[test]
fn corrupted_server_finished_is_handshake_failure() {
    let client = MockClient::new();

    let script = vec![
        ScriptItem::Message(HandshakeType::ServerHello, server_hello_body(None)),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::CorruptServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let alerts = record.alerts.clone();
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::HandshakeFailure(_)), "{:?}", error);

    let alerts = alerts.lock().unwrap();
    assert_eq!(
        &*alerts,
        &[(AlertLevel::Fatal, AlertDescription::HandshakeFailure)]
    );
}

#[test]
fn unsolicited_server_extension_is_fatal() {
    let client = MockClient::new();

    let mut extensions = ExtensionTable::new();
    extensions.insert(ExtensionType::Heartbeat, vec![0x01]);

    let script = vec![ScriptItem::Message(
        HandshakeType::ServerHello,
        server_hello_body(Some(extensions)),
    )];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::UnsupportedExtension(_)), "{:?}", error);
}

#[test]
fn offered_extension_may_be_echoed() {
    let mut client = MockClient::new();
    client
        .extensions
        .insert(ExtensionType::Heartbeat, vec![0x01]);
    let events = client.events.clone();

    let mut extensions = ExtensionTable::new();
    extensions.insert(ExtensionType::Heartbeat, vec![0x01]);
    let script = vec![
        ScriptItem::Message(
            HandshakeType::ServerHello,
            server_hello_body(Some(extensions)),
        ),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::ServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    new_protocol().connect(client, handshake).expect("handshake");

    let events = events.lock().unwrap();
    assert!(events.contains(&"secure_renegotiation:false".to_string()));
}

#[test]
fn renegotiation_info_sets_secure_flag() {
    let client = MockClient::new();
    let events = client.events.clone();

    let mut extensions = ExtensionTable::new();
    extensions.insert(ExtensionType::RenegotiationInfo, vec![0x00]);
    let script = vec![
        ScriptItem::Message(
            HandshakeType::ServerHello,
            server_hello_body(Some(extensions)),
        ),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::ServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    new_protocol().connect(client, handshake).expect("handshake");

    let events = events.lock().unwrap();
    assert!(events.contains(&"secure_renegotiation:true".to_string()));
}

#[test]
fn bad_renegotiation_info_payload_is_fatal() {
    let client = MockClient::new();

    let mut extensions = ExtensionTable::new();
    // Non-empty renegotiated_connection on an initial handshake.
    extensions.insert(ExtensionType::RenegotiationInfo, vec![0x01, 0xAB]);
    let script = vec![ScriptItem::Message(
        HandshakeType::ServerHello,
        server_hello_body(Some(extensions)),
    )];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::HandshakeFailure(_)), "{:?}", error);
}

#[test]
fn empty_extension_block_leaves_renegotiation_insecure() {
    let client = MockClient::new();
    let events = client.events.clone();

    let script = vec![
        ScriptItem::Message(
            HandshakeType::ServerHello,
            server_hello_body(Some(ExtensionTable::new())),
        ),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::ServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    new_protocol().connect(client, handshake).expect("handshake");

    let events = events.lock().unwrap();
    assert!(events.contains(&"secure_renegotiation:false".to_string()));
}

#[test]
fn client_auth_sends_certificate_and_verify() {
    let mut client = MockClient::new();
    let credentials = MockCredentials::signing();
    let signed = credentials.signed_hash_lens.clone();
    client.credentials = Some(credentials);
    let kx_calls = client.kx_calls.clone();

    let script = vec![
        ScriptItem::Message(HandshakeType::ServerHello, server_hello_body(None)),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(
            HandshakeType::CertificateRequest,
            certificate_request_body(),
        ),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::ServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);
    let sent = handshake.sent.clone();

    new_protocol().connect(client, handshake).expect("handshake");

    let sent = sent.lock().unwrap();
    let types: Vec<HandshakeType> = sent.iter().map(|(t, _)| *t).collect();
    assert_eq!(
        types,
        vec![
            HandshakeType::ClientHello,
            HandshakeType::Certificate,
            HandshakeType::ClientKeyExchange,
            HandshakeType::CertificateVerify,
            HandshakeType::Finished,
        ]
    );

    // The transcript signature covers MD5 ‖ SHA-1, 36 bytes.
    assert_eq!(&*signed.lock().unwrap(), &[36]);

    let kx_calls = kx_calls.lock().unwrap();
    assert!(kx_calls.contains(&"validate_certificate_request"));
    assert!(kx_calls.contains(&"process_client_credentials"));
    assert!(!kx_calls.contains(&"skip_client_credentials"));
}

#[test]
fn certificate_request_without_credentials_sends_empty_chain() {
    let client = MockClient::new();
    let kx_calls = client.kx_calls.clone();

    let script = vec![
        ScriptItem::Message(HandshakeType::ServerHello, server_hello_body(None)),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(
            HandshakeType::CertificateRequest,
            certificate_request_body(),
        ),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::ServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);
    let sent = handshake.sent.clone();

    new_protocol().connect(client, handshake).expect("handshake");

    let sent = sent.lock().unwrap();
    let certificate = sent
        .iter()
        .find(|(t, _)| *t == HandshakeType::Certificate)
        .expect("client Certificate sent");
    assert_eq!(certificate.1, vec![0x00, 0x00, 0x00], "empty chain");

    assert!(sent.iter().all(|(t, _)| *t != HandshakeType::CertificateVerify));
    assert!(kx_calls.lock().unwrap().contains(&"skip_client_credentials"));
}

#[test]
fn server_key_exchange_is_consumed() {
    let client = MockClient::new();
    let kx_calls = client.kx_calls.clone();

    let script = vec![
        ScriptItem::Message(HandshakeType::ServerHello, server_hello_body(None)),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(HandshakeType::ServerKeyExchange, b"skx-params".to_vec()),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::ServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    new_protocol().connect(client, handshake).expect("handshake");

    let kx_calls = kx_calls.lock().unwrap();
    assert!(kx_calls.contains(&"process_server_key_exchange"));
    assert!(!kx_calls.contains(&"skip_server_key_exchange"));
}

#[test]
fn supplemental_data_flows_both_ways() {
    let mut client = MockClient::new();
    client.supplemental_to_send = Some(vec![SupplementalDataEntry::new(
        0x4002,
        vec![0x01, 0x02],
    )]);
    let events = client.events.clone();

    let mut server_supplemental = Vec::new();
    SupplementalDataEntry::serialize_message(
        &[SupplementalDataEntry::new(0x4002, vec![0xEE])],
        &mut server_supplemental,
    );

    let script = vec![
        ScriptItem::Message(HandshakeType::ServerHello, server_hello_body(None)),
        ScriptItem::Message(HandshakeType::SupplementalData, server_supplemental),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(HandshakeType::ServerHelloDone, Vec::new()),
        ScriptItem::ServerFinished,
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);
    let sent = handshake.sent.clone();

    new_protocol().connect(client, handshake).expect("handshake");

    let sent = sent.lock().unwrap();
    let types: Vec<HandshakeType> = sent.iter().map(|(t, _)| *t).collect();
    assert_eq!(
        types,
        vec![
            HandshakeType::ClientHello,
            HandshakeType::SupplementalData,
            HandshakeType::ClientKeyExchange,
            HandshakeType::Finished,
        ]
    );

    let events = events.lock().unwrap();
    assert!(events.contains(&"server_supplemental:1".to_string()));
}

#[test]
fn non_empty_server_hello_done_is_fatal() {
    let client = MockClient::new();

    let script = vec![
        ScriptItem::Message(HandshakeType::ServerHello, server_hello_body(None)),
        ScriptItem::Message(HandshakeType::Certificate, certificate_body()),
        ScriptItem::Message(HandshakeType::ServerHelloDone, vec![0x00]),
    ];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::UnexpectedMessage(_)), "{:?}", error);
}

#[test]
fn wrong_first_message_is_unexpected() {
    let client = MockClient::new();

    let script = vec![ScriptItem::Message(
        HandshakeType::Certificate,
        certificate_body(),
    )];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let alerts = record.alerts.clone();
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::UnexpectedMessage(_)), "{:?}", error);

    let alerts = alerts.lock().unwrap();
    assert_eq!(
        &*alerts,
        &[(AlertLevel::Fatal, AlertDescription::UnexpectedMessage)]
    );
}

#[test]
fn hello_verify_request_with_wrong_version_is_fatal() {
    let client = MockClient::new();

    let mut hvr_body = Vec::new();
    HelloVerifyRequest::new(
        ProtocolVersion::DTLS1_2,
        Cookie::try_new(&[0x01, 0x02]).unwrap(),
    )
    .serialize(&mut hvr_body);

    let script = vec![ScriptItem::Message(
        HandshakeType::HelloVerifyRequest,
        hvr_body,
    )];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::DecodeError(_)), "{:?}", error);
}

#[test]
fn scsv_selected_by_server_is_fatal() {
    let client = MockClient::new();

    // Hand-build a ServerHello selecting the SCSV.
    let mut body = Vec::new();
    body.extend_from_slice(&[0xFE, 0xFF]);
    body.extend_from_slice(&SERVER_RANDOM);
    body.push(0x00); // empty session id
    body.extend_from_slice(&[0x00, 0xFF]); // SCSV
    body.push(0x00); // null compression

    let script = vec![ScriptItem::Message(HandshakeType::ServerHello, body)];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::IllegalParameter(_)), "{:?}", error);
}

#[test]
fn unoffered_suite_selected_by_server_is_fatal() {
    let client = MockClient::new();

    let mut body = Vec::new();
    body.extend_from_slice(&[0xFE, 0xFF]);
    body.extend_from_slice(&SERVER_RANDOM);
    body.push(0x00);
    body.extend_from_slice(&[0xC0, 0x14]); // ECDHE_RSA_AES256_CBC_SHA, not offered
    body.push(0x00);

    let script = vec![ScriptItem::Message(HandshakeType::ServerHello, body)];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::IllegalParameter(_)), "{:?}", error);
}

#[test]
fn trailing_bytes_after_server_hello_is_decode_error() {
    let client = MockClient::new();

    let mut body = server_hello_body(None);
    body.push(0xFF);

    let script = vec![ScriptItem::Message(HandshakeType::ServerHello, body)];

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, script);

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::DecodeError(_)), "{:?}", error);
}

#[test]
fn non_dtls_client_version_is_internal_error() {
    let mut client = MockClient::new();
    client.version = ProtocolVersion::from_u16(0x0301); // plain TLS 1.0

    let record = MockRecordLayer::new(ProtocolVersion::DTLS1_0);
    let handshake = MockHandshake::new(record, Vec::new());
    let sent = handshake.sent.clone();

    let error = new_protocol().connect(client, handshake).unwrap_err();
    assert!(matches!(error, Error::InternalError(_)), "{:?}", error);
    assert!(sent.lock().unwrap().is_empty());
}
