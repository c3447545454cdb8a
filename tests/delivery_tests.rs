#[cfg(test)]
mod delivery_tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use async_trait::async_trait;
    use rmc_dispatch_server::config::{BusinessConfig, TwilioConfig};
    use rmc_dispatch_server::delivery::{
        BusinessApiAdapter, DeliveryAdapter, DeliveryError, DeliveryPayload, DeliveryRequest,
        TwilioAdapter,
    };
    use rmc_dispatch_server::storage::{ObjectStorage, StorageError};

    /// Minimal HTTP stub that answers every request with the given status
    /// and body, and counts how many requests it saw.
    fn spawn_stub(status_line: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_counter = hits.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = match stream {
                    Ok(s) => s,
                    Err(_) => break,
                };
                hits_counter.fetch_add(1, Ordering::SeqCst);

                // Drain the request until the client stops sending.
                stream
                    .set_read_timeout(Some(Duration::from_millis(200)))
                    .ok();
                let mut buf = [0u8; 8192];
                loop {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(_) => continue,
                    }
                }

                let response = format!(
                    "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).ok();
            }
        });

        (format!("http://{}", addr), hits)
    }

    fn adapter(base_url: String) -> BusinessApiAdapter {
        BusinessApiAdapter::new(
            BusinessConfig {
                access_token: "test-token".to_string(),
                phone_number_id: "123456".to_string(),
                base_url,
            },
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_failed_media_upload_short_circuits_message_send() {
        let (base_url, hits) =
            spawn_stub("HTTP/1.1 400 Bad Request", r#"{"error":"media upload rejected"}"#);

        let request = DeliveryRequest {
            recipient: "+919876543210".to_string(),
            caption: "Invoice attached".to_string(),
            payload: DeliveryPayload::Document {
                filename: "invoice-20250506001-1.pdf".to_string(),
                bytes: b"%PDF-1.4 test".to_vec(),
            },
        };

        let result = adapter(base_url).send(&request).await;

        // The provider's error payload comes back verbatim.
        match result {
            Err(DeliveryError::Provider(body)) => {
                assert!(body.contains("media upload rejected"));
            }
            other => panic!("expected a provider error, got {:?}", other.map(|id| id.0)),
        }

        // Only the media upload reached the provider, never the message call.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_text_fallback_goes_straight_to_message_send() {
        let (base_url, hits) = spawn_stub(
            "HTTP/1.1 200 OK",
            r#"{"messaging_product":"whatsapp","messages":[{"id":"wamid.test123"}]}"#,
        );

        let request = DeliveryRequest {
            recipient: "+919876543210".to_string(),
            caption: "Invoice".to_string(),
            payload: DeliveryPayload::Text("Amount: ₹60000.00".to_string()),
        };

        let id = adapter(base_url)
            .send(&request)
            .await
            .expect("text send should succeed");
        assert_eq!(id.0, "wamid.test123");

        // Text sends are single-step: no media upload happened.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    /// Storage stub that counts uploads and records how many provider calls
    /// had already happened when the upload ran.
    struct RecordingStorage {
        uploads: Arc<AtomicUsize>,
        provider_hits_at_upload: Arc<AtomicUsize>,
        provider_hits: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ObjectStorage for RecordingStorage {
        async fn upload_file(&self, filename: &str, _bytes: &[u8]) -> Result<String, StorageError> {
            self.provider_hits_at_upload
                .store(self.provider_hits.load(Ordering::SeqCst), Ordering::SeqCst);
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("http://127.0.0.1:8080/uploads/{}", filename))
        }
    }

    fn twilio_adapter(
        base_url: String,
        provider_hits: Arc<AtomicUsize>,
    ) -> (TwilioAdapter, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let uploads = Arc::new(AtomicUsize::new(0));
        let provider_hits_at_upload = Arc::new(AtomicUsize::new(usize::MAX));
        let storage = Arc::new(RecordingStorage {
            uploads: uploads.clone(),
            provider_hits_at_upload: provider_hits_at_upload.clone(),
            provider_hits,
        });
        let adapter = TwilioAdapter::new(
            TwilioConfig {
                account_sid: "AC_test".to_string(),
                auth_token: "token".to_string(),
                from_number: "+14155238886".to_string(),
                base_url,
            },
            reqwest::Client::new(),
            storage,
        );
        (adapter, uploads, provider_hits_at_upload)
    }

    #[tokio::test]
    async fn test_hosted_url_upload_precedes_messages_call() {
        let (base_url, hits) = spawn_stub("HTTP/1.1 201 Created", r#"{"sid":"SM_test123"}"#);
        let (adapter, uploads, provider_hits_at_upload) =
            twilio_adapter(base_url, hits.clone());

        let request = DeliveryRequest {
            recipient: "+919876543210".to_string(),
            caption: "Invoice attached".to_string(),
            payload: DeliveryPayload::Document {
                filename: "invoice-20250506001-1.pdf".to_string(),
                bytes: b"%PDF-1.4 test".to_vec(),
            },
        };

        let id = adapter
            .send(&request)
            .await
            .expect("hosted-url send should succeed");
        assert_eq!(id.0, "SM_test123");

        // The document goes to storage first; the Messages call had not yet
        // happened when the upload ran.
        assert_eq!(uploads.load(Ordering::SeqCst), 1);
        assert_eq!(provider_hits_at_upload.load(Ordering::SeqCst), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_twilio_provider_error_propagates_verbatim() {
        let (base_url, hits) = spawn_stub(
            "HTTP/1.1 401 Unauthorized",
            r#"{"code":20003,"message":"Authentication Error - invalid username"}"#,
        );
        let (adapter, uploads, _) = twilio_adapter(base_url, hits.clone());

        let request = DeliveryRequest {
            recipient: "+919876543210".to_string(),
            caption: "Invoice attached".to_string(),
            payload: DeliveryPayload::Document {
                filename: "invoice-20250506001-1.pdf".to_string(),
                bytes: b"%PDF-1.4 test".to_vec(),
            },
        };

        let result = adapter.send(&request).await;
        match result {
            Err(DeliveryError::Provider(body)) => {
                assert!(body.contains("20003"));
                assert!(body.contains("Authentication Error - invalid username"));
            }
            other => panic!("expected a provider error, got {:?}", other.map(|id| id.0)),
        }
        assert_eq!(uploads.load(Ordering::SeqCst), 1);
    }
}
