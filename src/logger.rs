//! 日志输出
//!
//! 所有诊断信息都通过 `tracing` 输出，每次运行只注册一个输出端（sink）：
//! 默认控制台，也可以是日志文件，或者进程内通道（供外部界面消费）。

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::EnvFilter;

/// 日志输出端
#[derive(Debug, Clone, Default)]
pub enum LogSink {
    /// 控制台（标准输出）
    #[default]
    Console,
    /// 追加写入文件
    File(PathBuf),
    /// 每行日志作为一条消息发送到通道
    Channel(Sender<String>),
}

/// 构建订阅者，不安装为全局默认
///
/// 可配合 `tracing::instrument::WithSubscriber` 绑定到单次运行
pub fn subscriber(sink: LogSink, verbose: bool) -> io::Result<impl Subscriber + Send + Sync + 'static> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let ansi = matches!(sink, LogSink::Console);
    let writer = match sink {
        LogSink::Console => BoxMakeWriter::new(io::stdout),
        LogSink::File(path) => {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            writeln!(
                file,
                "{}\n存稿日志 - {}\n{}",
                "=".repeat(60),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                "=".repeat(60)
            )?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        LogSink::Channel(tx) => BoxMakeWriter::new(ChannelMakeWriter { tx }),
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .finish())
}

/// 安装全局日志订阅者
pub fn init(sink: LogSink, verbose: bool) -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(subscriber(sink, verbose)?)?;
    Ok(())
}

#[derive(Clone)]
struct ChannelMakeWriter {
    tx: Sender<String>,
}

impl<'a> MakeWriter<'a> for ChannelMakeWriter {
    type Writer = ChannelWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ChannelWriter {
            tx: self.tx.clone(),
            buf: Vec::new(),
        }
    }
}

/// 缓冲一条事件的输出，drop 时整行发送
struct ChannelWriter {
    tx: Sender<String>,
    buf: Vec<u8>,
}

impl Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ChannelWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf).trim_end().to_string();
        // 接收端已关闭时丢弃
        let _ = self.tx.send(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_channel_sink_receives_each_line_once() {
        let (tx, rx) = mpsc::channel();
        let sub = subscriber(LogSink::Channel(tx), false).unwrap();

        tracing::subscriber::with_default(sub, || {
            tracing::info!("第一行");
            tracing::warn!("第二行");
        });

        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("第一行"));
        assert!(lines[1].contains("第二行"));
    }

    #[test]
    fn test_file_sink_writes_header_and_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let sub = subscriber(LogSink::File(path.clone()), false).unwrap();

        tracing::subscriber::with_default(sub, || {
            tracing::info!("写入文件");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("存稿日志"));
        assert!(content.contains("写入文件"));
    }
}
