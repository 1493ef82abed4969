// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::commands::SubCmd;
use bitstream::config::{
    CANISTER_ID_ENV, DEFAULT_CANISTER_ID, DEFAULT_HOST, DEFAULT_IDENTITY_PROVIDER, HOST_ENV,
    IDENTITY_PROVIDER_ENV,
};
use bitstream_logging::{LogFormat, LogOutputDest};
use clap::Parser;

// Please do not remove the blank lines in these doc comments.
// They are used for inserting line breaks when the help menu is rendered in the UI.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Opt {
    /// Available sub commands.
    #[clap(subcommand)]
    pub command: SubCmd,

    /// Specify the logging format.
    ///
    /// Valid values are "default" or "json".
    ///
    /// If the argument is not used, the default format will be applied.
    #[clap(long, value_parser = LogFormat::parse_from_str, verbatim_doc_comment)]
    pub log_format: Option<LogFormat>,

    /// Specify the logging output destination.
    ///
    /// Valid values are "stdout", "stderr", "data-dir", or a custom path.
    ///
    /// `data-dir` is the default value.
    ///
    /// The data directory location is platform specific:
    ///  - Linux: $HOME/.local/share/bitstream/client/logs
    ///  - macOS: $HOME/Library/Application Support/bitstream/client/logs
    ///  - Windows: C:\Users\<username>\AppData\Roaming\bitstream\client\logs
    #[allow(rustdoc::invalid_html_tags)]
    #[clap(long, value_parser = LogOutputDest::parse_from_str, verbatim_doc_comment, default_value = "data-dir")]
    pub log_output_dest: LogOutputDest,

    /// Specify the maximum number of uncompressed log files to store.
    ///
    /// This argument is ignored if `log_output_dest` is set to "stdout" or "stderr".
    ///
    /// After reaching this limit, the older files are archived to save space.
    /// You can also specify the maximum number of archived log files to keep.
    #[clap(long, verbatim_doc_comment)]
    pub max_log_files: Option<usize>,

    /// Specify the maximum number of archived log files to store.
    ///
    /// This argument is ignored if `log_output_dest` is set to "stdout" or "stderr".
    ///
    /// After reaching this limit, the older archived files are deleted.
    #[clap(long, verbatim_doc_comment)]
    pub max_archived_log_files: Option<usize>,

    /// The replica serving the payment-stream canister.
    #[clap(long, global = true, env = HOST_ENV, default_value = DEFAULT_HOST)]
    pub host: String,

    /// The payment-stream canister id.
    #[clap(long, global = true, env = CANISTER_ID_ENV, default_value = DEFAULT_CANISTER_ID)]
    pub canister_id: String,

    /// The identity provider used by the internet-identity wallet.
    #[clap(long, global = true, env = IDENTITY_PROVIDER_ENV, default_value = DEFAULT_IDENTITY_PROVIDER)]
    pub identity_provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;

    #[test]
    fn log_file_limits_are_parsed() -> Result<()> {
        let opt = Opt::try_parse_from([
            "bitstream",
            "--log-output-dest",
            "stderr",
            "--max-log-files",
            "3",
            "--max-archived-log-files",
            "5",
            "dashboard",
        ])?;

        assert_eq!(opt.log_output_dest, LogOutputDest::Stderr);
        assert_eq!(opt.max_log_files, Some(3));
        assert_eq!(opt.max_archived_log_files, Some(5));
        assert!(matches!(opt.command, SubCmd::Dashboard));
        Ok(())
    }

    #[test]
    fn log_file_limits_default_to_unset() -> Result<()> {
        let opt = Opt::try_parse_from(["bitstream", "--log-output-dest", "stdout", "dashboard"])?;
        assert_eq!(opt.max_log_files, None);
        assert_eq!(opt.max_archived_log_files, None);
        Ok(())
    }
}
