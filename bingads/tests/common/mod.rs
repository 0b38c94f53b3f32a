#![allow(dead_code)]

use bingads::{Client, ClientBuilder, Service, ServiceKind};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

pub const WSDL: &str = include_str!("../fixtures/CampaignManagement.wsdl");

/// Loopback HTTP server answering one canned response per connection
pub struct StubServer {
    pub url: String,
    handle: JoinHandle<Vec<String>>,
}

impl StubServer {
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!(
            "http://{}/Api/Advertiser/CampaignManagement/v13/CampaignManagementService.svc",
            listener.local_addr().unwrap()
        );

        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                requests.push(read_request(&mut stream));
                write!(
                    stream,
                    "HTTP/1.1 {status} Stub\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
                .unwrap();
            }
            requests
        });

        Self { url, handle }
    }

    /// Raw requests received, in order
    pub fn requests(self) -> Vec<String> {
        self.handle.join().unwrap()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                return text;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

/// WSDL directory laid out as `<dir>/production/CampaignManagement.wsdl`
pub fn wsdl_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let production = dir.path().join("production");
    std::fs::create_dir(&production).unwrap();
    std::fs::write(
        production.join(ServiceKind::CampaignManagement.wsdl_file_name()),
        WSDL,
    )
    .unwrap();
    dir
}

/// Campaign management service of a client built by `configure`, pointed at
/// `endpoint`
pub fn campaign_service(
    dir: &TempDir,
    endpoint: &str,
    configure: impl FnOnce(ClientBuilder) -> ClientBuilder,
) -> (Client, Service) {
    let builder = Client::builder().wsdl_dir(dir.path());
    let client = configure(builder).build().unwrap();
    let mut service = client.service(ServiceKind::CampaignManagement).unwrap();
    service.set_endpoint(endpoint);
    (client, service)
}

pub fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>{body}</s:Body></s:Envelope>"#
    )
}
