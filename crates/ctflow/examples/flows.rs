//! List connection tracking entries.
//!
//! This example dumps the kernel's conntrack table and prints one line
//! per tracked connection, for IPv4 and then IPv6.
//!
//! Run with: cargo run -p ctflow --example flows
//!
//! Note: Requires conntrack to be enabled in the kernel and usually
//! CAP_NET_ADMIN.

use std::net::IpAddr;

use ctflow::{Connection, Flow, IpProtocol, Netfilter};

fn endpoint(ip: Option<IpAddr>, port: u16) -> String {
    match ip {
        Some(ip) => format!("{}:{}", ip, port),
        None => format!("?:{}", port),
    }
}

fn print_flow(flow: &Flow) {
    let proto = match flow.forward.protocol {
        IpProtocol::Tcp => "tcp",
        IpProtocol::Udp => "udp",
        IpProtocol::Icmp => "icmp",
        IpProtocol::Icmpv6 => "icmpv6",
        IpProtocol::Other(_) => "other",
    };

    println!(
        "{:<7} {:<28} {:<28}",
        proto,
        endpoint(flow.forward.src_ip, flow.forward.src_port),
        endpoint(flow.forward.dst_ip, flow.forward.dst_port),
    );
}

#[tokio::main]
async fn main() -> ctflow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let conn = Connection::<Netfilter>::new()?;

    println!("=== IPv4 Connection Tracking Entries ===\n");
    let results = conn.dump_flows_v4().await?;

    if results.is_empty() {
        println!("No connection tracking entries found.");
        println!("(Connection tracking may not be enabled or there are no active connections)\n");
    } else {
        println!("{:<7} {:<28} {:<28}", "PROTO", "SOURCE", "DESTINATION");
        println!("{}", "-".repeat(64));

        let mut failed = 0usize;
        for result in &results {
            match result {
                Ok(flow) => print_flow(flow),
                Err(_) => failed += 1,
            }
        }

        println!("\nTotal: {} entries", results.len());
        if failed > 0 {
            println!("({} entries failed to decode)", failed);
        }
    }

    println!("\n=== IPv6 Connection Tracking Entries ===\n");
    let results_v6 = conn.dump_flows_v6().await?;

    if results_v6.is_empty() {
        println!("No IPv6 connection tracking entries found.");
    } else {
        for result in results_v6.iter().take(5).flatten() {
            print_flow(result);
        }
        if results_v6.len() > 5 {
            println!("  ... and {} more", results_v6.len() - 5);
        }
    }

    Ok(())
}
