/*
 * vSMTP mail transfer agent
 *
 * Copyright (C) 2003 - viridIT SAS
 * Licensed under the Elastic License 2.0
 *
 * You should have received a copy of the Elastic License 2.0 along with
 * this program. If not, see https://www.elastic.co/licensing/elastic-license.
 *
 */

/// Run the command check over a single transaction.
#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the rhai configuration file.
    #[arg(short, long, default_value_t = String::from("/etc/vcheck/conf.d/config.rhai"))]
    pub config: String,
    /// Identifier of the message.
    #[arg(long, default_value_t = String::from("vcheck"))]
    pub msg_id: String,
    /// Identity of the authenticated client.
    #[arg(long)]
    pub auth_user: Option<String>,
    /// Address and port of the client.
    #[arg(long)]
    pub source_ip: Option<std::net::SocketAddr>,
    /// Name announced by the client in HELO / EHLO.
    #[arg(long)]
    pub source_host: Option<String>,
    /// Reverse DNS name of the client.
    #[arg(long)]
    pub source_rdns: Option<String>,
    /// Address of the MAIL FROM command.
    #[arg(long)]
    pub sender: Option<String>,
    /// Address of a RCPT TO command, may be repeated.
    #[arg(long)]
    pub rcpt: Vec<String>,
    /// File holding the message, header block included.
    #[arg(short, long)]
    pub message: Option<std::path::PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::Args;

    #[test]
    fn parse() {
        let args = <Args as clap::Parser>::try_parse_from([
            "vcheck",
            "--config",
            "/tmp/config.rhai",
            "--source-ip",
            "192.0.2.10:25",
            "--sender",
            "s@x.test",
            "--rcpt",
            "a@x.test",
            "--rcpt",
            "b@x.test",
        ])
        .unwrap();

        pretty_assertions::assert_eq!(args.config, "/tmp/config.rhai");
        pretty_assertions::assert_eq!(args.msg_id, "vcheck");
        pretty_assertions::assert_eq!(args.rcpt, ["a@x.test", "b@x.test"]);
        pretty_assertions::assert_eq!(args.sender.as_deref(), Some("s@x.test"));
        assert!(args.message.is_none());
    }

    #[test]
    fn verify() {
        <Args as clap::CommandFactory>::command().debug_assert();
    }
}
