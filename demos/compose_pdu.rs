// ABOUTME: Command-line demo that composes an M-Send.req, decodes it back and optionally posts it
// ABOUTME: With --mmsc the PDU goes through the full send transaction over HTTP

use argh::FromArgs;
use bytes::Bytes;
use mms::datatypes::{PduBody, PduPart, Priority, ReportFlag};
use mms::gateway::{
    CarrierConfigResolver, CarrierEntry, CarrierTable, Folder, HttpNetworkGateway,
    MemoryPersister, MmsConfig, OperatorInfo,
};
use mms::http::HttpConfig;
use mms::transaction::{SendTransaction, Transaction, TransactionConfig};
use mms::{GenericPdu, SendReq, parse, try_compose};
use std::error::Error;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Compose an MMS send request and optionally deliver it to an MMSC
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the sender address (default: +15555550100)
    #[argh(option, short = 'f')]
    from: Option<String>,

    /// the message subject
    #[argh(option, short = 's')]
    subject: Option<String>,

    /// a text/plain body part
    #[argh(option, short = 't')]
    text: Option<String>,

    /// mark the message high priority
    #[argh(switch)]
    high_priority: bool,

    /// request a delivery report
    #[argh(switch)]
    delivery_report: bool,

    /// MMSC URL to post the message to (no network access if omitted)
    #[argh(option)]
    mmsc: Option<String>,

    /// MMS proxy as host:port
    #[argh(option)]
    proxy: Option<String>,
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_request(args: &CliArgs) -> SendReq {
    let mut body = PduBody::new();
    if let Some(text) = &args.text {
        body.add_part(
            PduPart::with_data("text/plain", Bytes::copy_from_slice(text.as_bytes()))
                .content_id(Some("<text0>".into())),
        );
    }

    SendReq::new()
        .from(Some(args.from.as_deref().unwrap_or("+15555550100").into()))
        .subject(args.subject.as_deref().map(Into::into))
        .priority(if args.high_priority { Priority::High } else { Priority::Normal })
        .delivery_report(ReportFlag::from(args.delivery_report))
        .body(body)
}

fn resolver_for(mmsc: &str, proxy: Option<&str>) -> Result<CarrierConfigResolver, Box<dyn Error>> {
    let mut config = MmsConfig::new(mmsc);
    if let Some(proxy) = proxy {
        let (host, port) = proxy
            .rsplit_once(':')
            .ok_or_else(|| format!("proxy must be host:port, got {proxy}"))?;
        config = config.with_proxy(host, port.parse()?);
    }
    let table = CarrierTable::new(vec![CarrierEntry {
        network_codes: vec!["001001".into()],
        name: "Demo".into(),
        config,
    }]);
    Ok(CarrierConfigResolver::new(OperatorInfo::new("001001", "Demo")).with_table(table))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::DEBUG } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let request = build_request(&cli_args);
    let bytes = try_compose(&GenericPdu::from(request.clone()))?;
    info!(len = bytes.len(), "composed M-Send.req");
    println!("{}", hex(&bytes));

    match parse(&bytes) {
        Some(pdu) => println!("decoded: {pdu:#?}"),
        None => error!("composed PDU did not decode"),
    }

    let Some(mmsc) = cli_args.mmsc.as_deref() else {
        return Ok(());
    };

    let resolver = resolver_for(mmsc, cli_args.proxy.as_deref())?;
    let network = Arc::new(HttpNetworkGateway::new(HttpConfig::default(), resolver));
    let store = Arc::new(MemoryPersister::new());
    let draft = Folder::Outbox.uri().child(1);
    store.insert(draft.clone(), request.into());

    let config = TransactionConfig::default().with_max_retry_count(0);
    let mut transaction = SendTransaction::new(draft, store, network, config);
    let state = transaction.process().await;
    match transaction.state().error() {
        Some(reason) => error!(%state, reason, "send finished"),
        None => info!(%state, uri = ?transaction.state().content_uri(), "send finished"),
    }

    Ok(())
}
