use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{BufferedStandardStream, ColorChoice, WriteColor};
use itertools::Itertools;
use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::files::{FileId, Files};
use crate::pass::surface_to_cpp::{self, Artifacts};
use crate::reporting::Message;
use crate::source::{ProgramSource, SourceTooBig, MAX_SOURCE_LEN};
use crate::surface::SourceFile;
use crate::BUG_REPORT_URL;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Error => 1,
        }
    }

    /// Combine the statuses of two compilations, failing if either failed.
    pub fn merge(self, other: Status) -> Status {
        match (self, other) {
            (Status::Ok, Status::Ok) => Status::Ok,
            _ => Status::Error,
        }
    }
}

/// Where generated artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Write `<stem>.hpp` and `<stem>.cpp` under a directory.
    Directory(PathBuf),
    /// Print the input and both artifacts to the emit writer.
    Debug,
}

impl Default for Output {
    fn default() -> Output {
        Output::Directory(PathBuf::from("out"))
    }
}

pub struct Driver {
    files: Files,
    output: Output,

    codespan_config: codespan_reporting::term::Config,
    diagnostic_writer: RefCell<Box<dyn WriteColor>>,
    emit_writer: RefCell<Box<dyn WriteColor>>,
}

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            files: Files::new(),
            output: Output::default(),

            codespan_config: codespan_reporting::term::Config::default(),
            diagnostic_writer: RefCell::new(Box::new(BufferedStandardStream::stderr(
                color_choice(atty::Stream::Stderr),
            ))),
            emit_writer: RefCell::new(Box::new(BufferedStandardStream::stdout(color_choice(
                atty::Stream::Stdout,
            )))),
        }
    }

    /// Setup a global panic hook
    pub fn install_panic_hook(&self) {
        // Use the currently set codespan configuration
        let term_config = self.codespan_config.clone();
        // Fetch the default hook (which prints the panic message and an optional backtrace)
        let default_hook = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            let location = info.location();
            let message = if let Some(message) = info.payload().downcast_ref::<String>() {
                message.as_str()
            } else if let Some(message) = info.payload().downcast_ref::<&str>() {
                message
            } else {
                "unknown panic type"
            };

            let diagnostic = Diagnostic::bug()
                .with_message(format!("compiler panicked at '{message}'"))
                .with_notes(vec![
                    match location {
                        Some(location) => format!("panicked at: {location}"),
                        None => "panicked at: unknown location".to_owned(),
                    },
                    format!("please file a bug report at: {BUG_REPORT_URL}"),
                ]);

            let mut writer = BufferedStandardStream::stderr(color_choice(atty::Stream::Stderr));
            let dummy_files = SimpleFiles::<String, String>::new();

            default_hook(info);
            eprintln!();
            // Nothing more can be done if this fails while panicking
            let _ = codespan_reporting::term::emit(&mut writer, &term_config, &dummy_files, &diagnostic)
                .and_then(|()| Ok(writer.flush()?));
        }));
    }

    /// Set where generated artifacts are written
    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    /// Set the writer to use when rendering diagnostics
    pub fn set_diagnostic_writer(&mut self, stream: impl 'static + WriteColor) {
        self.diagnostic_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Set the writer to use when printing artifacts in debug mode
    pub fn set_emit_writer(&mut self, stream: impl 'static + WriteColor) {
        self.emit_writer = RefCell::new(Box::new(stream) as Box<dyn WriteColor>);
    }

    /// Load a source string into the file database.
    pub fn load_source_string(&mut self, name: String, source: String) -> Option<FileId> {
        match ProgramSource::try_from(source) {
            Ok(source) => Some(self.files.add(name, source)),
            Err(SourceTooBig { actual_len }) => {
                self.emit_diagnostic(Diagnostic::error().with_message(format!(
                    "`{name}` is too big to compile: {actual_len} bytes (the maximum is {MAX_SOURCE_LEN} bytes)"
                )));
                None
            }
        }
    }

    /// Load a source file into the file database using a reader.
    pub fn load_source(&mut self, name: String, mut reader: impl Read) -> Option<FileId> {
        let mut source = String::new();
        match reader.read_to_string(&mut source) {
            Ok(_) => self.load_source_string(name, source),
            Err(error) => {
                self.emit_read_diagnostic(name, error);
                None
            }
        }
    }

    /// Load a source file into the file database from the given path.
    pub fn load_source_path(&mut self, path: &Path) -> Option<FileId> {
        match std::fs::File::open(path) {
            Ok(file) => self.load_source(path.display().to_string(), file),
            Err(error) => {
                self.emit_read_diagnostic(path.display(), error);
                None
            }
        }
    }

    /// Parse a loaded file and generate its artifacts.
    pub fn compile(&self, file_id: FileId) -> Result<Artifacts, Message> {
        let file = self.files.get(file_id).expect("file was loaded by this driver");
        let source_file = SourceFile::parse(file_id, file.source())?;
        let artifacts = surface_to_cpp::generate(&source_file, &artifact_stem(file.name()))?;

        Ok(artifacts)
    }

    /// Compile a loaded file, then write its artifacts or report why it failed.
    pub fn compile_and_emit(&self, file_id: FileId) -> Status {
        match self.compile(file_id) {
            Ok(artifacts) => self.emit_artifacts(file_id, &artifacts),
            Err(message) => {
                self.emit_diagnostic(message.to_diagnostic());
                Status::Error
            }
        }
    }

    /// Load and compile each file in turn. A failing file does not stop the
    /// files after it from being compiled.
    pub fn compile_paths(&mut self, paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Status {
        let mut status = Status::Ok;
        for path in paths {
            let file_status = match self.load_source_path(path.as_ref()) {
                Some(file_id) => self.compile_and_emit(file_id),
                None => Status::Error,
            };
            status = status.merge(file_status);
        }
        status
    }

    fn emit_artifacts(&self, file_id: FileId, artifacts: &Artifacts) -> Status {
        let file = self.files.get(file_id).expect("file was loaded by this driver");
        let stem = artifact_stem(file.name());

        match &self.output {
            Output::Debug => match self.emit_debug(file.name(), file.source(), &stem, artifacts) {
                Ok(()) => Status::Ok,
                Err(error) => {
                    self.emit_write_diagnostic("standard output", error);
                    Status::Error
                }
            },
            Output::Directory(directory) => {
                let outputs = [("cpp", &artifacts.source), ("hpp", &artifacts.header)];
                for (extension, text) in outputs {
                    let path = directory.join(format!("{stem}.{extension}"));
                    if let Err(error) = write_file(&path, text) {
                        self.emit_write_diagnostic(path.display(), error);
                        return Status::Error;
                    }
                }
                Status::Ok
            }
        }
    }

    fn emit_debug(
        &self,
        name: &str,
        source: &str,
        stem: &str,
        artifacts: &Artifacts,
    ) -> io::Result<()> {
        let mut writer = self.emit_writer.borrow_mut();

        writeln!(writer, "//<< [{name}]")?;
        write!(writer, "{source}")?;
        if !source.is_empty() && !source.ends_with('\n') {
            writeln!(writer)?;
        }
        writeln!(writer, "//>> [{stem}.cpp]")?;
        write!(writer, "{}", artifacts.source)?;
        writeln!(writer, "//>> [{stem}.hpp]")?;
        write!(writer, "{}", artifacts.header)?;

        writer.flush()
    }

    fn emit_diagnostic(&self, diagnostic: Diagnostic<FileId>) {
        let mut writer = self.diagnostic_writer.borrow_mut();
        let config = &self.codespan_config;

        codespan_reporting::term::emit(&mut *writer, config, &self.files, &diagnostic).unwrap();
        writer.flush().unwrap();
    }

    fn emit_read_diagnostic(&self, name: impl std::fmt::Display, error: io::Error) {
        let diagnostic =
            Diagnostic::error().with_message(format!("couldn't read `{name}`: {error}"));
        self.emit_diagnostic(diagnostic);
    }

    fn emit_write_diagnostic(&self, name: impl std::fmt::Display, error: io::Error) {
        let diagnostic =
            Diagnostic::error().with_message(format!("couldn't write `{name}`: {error}"));
        self.emit_diagnostic(diagnostic);
    }
}

impl Default for Driver {
    fn default() -> Driver {
        Driver::new()
    }
}

/// The path of a file's artifacts relative to the output directory, without
/// their extension. Root, `.` and `..` components of the file name are
/// dropped.
pub fn artifact_stem(name: &str) -> String {
    let stem = Path::new(name)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::Prefix(_) | Component::RootDir | Component::CurDir | Component::ParentDir => {
                None
            }
        })
        .join("/");

    if stem.is_empty() {
        "unnamed".to_owned()
    } else {
        stem
    }
}

fn write_file(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)
}
