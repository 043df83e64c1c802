//! [`Player`] implementation backed by the [`mpd`] client library.
//!
//! The library speaks the protocol.  This module opens the socket with
//! bounded timeouts, so a wedged daemon shows up as an [`MpdError::Io`]
//! instead of hanging the poll loop, and translates between the library's
//! types and ours.

use crate::config::MpdConfig;
use crate::observation::{PlaybackStatus, Song};
use crate::remote::Action;
use crate::traits::Player;
use log::{debug, info};
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Errors that can occur when talking to MPD.
#[derive(Debug, thiserror::Error)]
pub enum MpdError {
    /// The connection could not be established or was lost.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The server sent something the library could not make sense of.
    #[error("protocol error: {0}")]
    Protocol(#[source] mpd::error::Error),
    /// The server rejected a command.
    #[error("mpd error: {0}")]
    Server(mpd::error::ServerError),
}

impl MpdError {
    /// `true` for connection-level failures (refused, reset, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, MpdError::Io(_))
    }
}

impl From<mpd::error::Error> for MpdError {
    fn from(e: mpd::error::Error) -> Self {
        match e {
            mpd::error::Error::Io(e) => MpdError::Io(e),
            mpd::error::Error::Server(e) => MpdError::Server(e),
            other => MpdError::Protocol(other),
        }
    }
}

/// A [`TcpStream`] that reports end-of-stream as an error.
///
/// The library reads a reply until `OK` and takes a closed socket for the
/// end of an empty reply, which would turn a dead daemon into a stopped one.
/// MPD never closes a connection in the middle of a reply.
struct Socket(TcpStream);

impl Read for Socket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 if !buf.is_empty() => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by MPD",
            )),
            n => Ok(n),
        }
    }
}

impl Write for Socket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// A live connection to MPD.
///
/// The socket is closed when the client is dropped.
pub struct MpdClient {
    client: mpd::Client<Socket>,
}

impl MpdClient {
    /// Connect to `host:port`, read the greeting and, when configured, send
    /// the password.
    pub fn connect(config: &MpdConfig) -> Result<Self, MpdError> {
        let timeout = config.timeout();
        let stream = connect_any(&config.host, config.port, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        let mut client = mpd::Client::new(Socket(stream))?;
        if let Some(pw) = &config.password {
            client.login(pw)?;
        }
        let mpd::Version(major, minor, patch) = client.version;
        info!("connected to MPD {}.{}.{} at {}:{}", major, minor, patch, config.host, config.port);
        Ok(Self { client })
    }

    /// Protocol version announced in the greeting.
    pub fn version(&self) -> mpd::Version {
        self.client.version
    }
}

/// Try every resolved address for `host:port` in turn.
fn connect_any(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, MpdError> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(s) => return Ok(s),
            Err(e) => {
                debug!("connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }
    Err(last_err
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} resolved to no addresses", host)))
        .into())
}

fn playback_status(state: mpd::State) -> PlaybackStatus {
    match state {
        mpd::State::Play => PlaybackStatus::Playing,
        mpd::State::Pause => PlaybackStatus::Paused,
        mpd::State::Stop => PlaybackStatus::Stopped,
    }
}

fn into_song(song: mpd::Song) -> Song {
    let album = song
        .tags
        .iter()
        .find(|(key, _)| key == "Album")
        .map(|(_, value)| value.clone());
    Song {
        file: song.file,
        artist: song.artist,
        album,
        title: song.title,
    }
}

//  Player implementation

impl Player for MpdClient {
    type Error = MpdError;

    fn status(&mut self) -> Result<PlaybackStatus, MpdError> {
        Ok(playback_status(self.client.status()?.state))
    }

    fn current_song(&mut self) -> Result<Option<Song>, MpdError> {
        Ok(self.client.currentsong()?.map(into_song))
    }

    fn control(&mut self, action: Action) -> Result<(), MpdError> {
        debug!("> {}", action);
        let result = match action {
            Action::Play => self.client.play(),
            Action::Pause => self.client.pause(true),
            Action::Toggle => self.client.toggle_pause(),
            Action::Next => self.client.next(),
            Action::Prev => self.client.prev(),
            Action::Stop => self.client.stop(),
        };
        Ok(result?)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    const STATUS_PLAY: &str = "volume: 80\nrepeat: 0\nrandom: 0\nsingle: 0\nconsume: 0\nplaylist: 7\n\
                               playlistlength: 12\nstate: play\nsong: 3\nsongid: 4\nreplay_gain_mode: off\nOK\n";

    /// Start a one-connection MPD imitation on a loopback port.
    ///
    /// After the greeting it answers each `(expected command, reply)` pair
    /// in order, then closes the connection.  A command list counts as one
    /// request named after its first command.  The thread returns the
    /// requests it actually received.
    fn fake_mpd(script: Vec<(&'static str, &'static str)>) -> (MpdConfig, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut writer = stream.try_clone().unwrap();
            let mut reader = BufReader::new(stream);
            writer.write_all(b"OK MPD 0.23.5\n").unwrap();
            let mut received = Vec::new();
            for (_, reply) in script {
                let Some(request) = read_request(&mut reader) else {
                    break;
                };
                received.push(request);
                writer.write_all(reply.as_bytes()).unwrap();
            }
            received
        });
        let config = MpdConfig {
            host: "127.0.0.1".into(),
            port,
            password: None,
            timeout_ms: 2000,
        };
        (config, handle)
    }

    fn read_request(reader: &mut impl BufRead) -> Option<String> {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        if line.trim_end() != "command_list_begin" {
            return Some(line.trim_end().to_string());
        }
        let mut first = None;
        loop {
            line.clear();
            if reader.read_line(&mut line).ok()? == 0 {
                return None;
            }
            match line.trim_end() {
                "command_list_end" => return first,
                cmd => {
                    first.get_or_insert_with(|| cmd.to_string());
                }
            }
        }
    }

    #[test]
    fn reads_greeting_version() {
        let (config, server) = fake_mpd(vec![]);
        let client = MpdClient::connect(&config).unwrap();
        assert_eq!(client.version(), mpd::Version(0, 23, 5));
        drop(client);
        server.join().unwrap();
    }

    #[test]
    fn status_and_current_song() {
        let (config, server) = fake_mpd(vec![
            ("status", STATUS_PLAY),
            (
                "currentsong",
                "file: music/a.flac\nArtist: Boards of Canada\nAlbum: Geogaddi\nTitle: Julie and Candy\n\
                 Time: 400\nPos: 3\nId: 4\nOK\n",
            ),
        ]);
        let mut client = MpdClient::connect(&config).unwrap();

        assert_eq!(client.status().unwrap(), PlaybackStatus::Playing);
        let song = client.current_song().unwrap().unwrap();
        assert_eq!(song.file, "music/a.flac");
        assert_eq!(song.artist.as_deref(), Some("Boards of Canada"));
        assert_eq!(song.album.as_deref(), Some("Geogaddi"));
        assert_eq!(song.title.as_deref(), Some("Julie and Candy"));

        drop(client);
        assert_eq!(server.join().unwrap(), vec!["status", "currentsong"]);
    }

    #[test]
    fn paused_and_stopped_states() {
        let (config, server) = fake_mpd(vec![("status", "state: pause\nOK\n"), ("status", "state: stop\nOK\n")]);
        let mut client = MpdClient::connect(&config).unwrap();
        assert_eq!(client.status().unwrap(), PlaybackStatus::Paused);
        assert_eq!(client.status().unwrap(), PlaybackStatus::Stopped);
        drop(client);
        server.join().unwrap();
    }

    #[test]
    fn empty_currentsong_is_no_track() {
        let (config, server) = fake_mpd(vec![("currentsong", "OK\n")]);
        let mut client = MpdClient::connect(&config).unwrap();
        assert_eq!(client.current_song().unwrap(), None);
        drop(client);
        server.join().unwrap();
    }

    #[test]
    fn untagged_stream_has_no_artist_or_title() {
        let (config, server) = fake_mpd(vec![("currentsong", "file: http://radio/stream\nPos: 0\nId: 1\nOK\n")]);
        let mut client = MpdClient::connect(&config).unwrap();
        let song = client.current_song().unwrap().unwrap();
        assert_eq!(song.file, "http://radio/stream");
        assert_eq!(song.artist, None);
        assert_eq!(song.title, None);
        drop(client);
        server.join().unwrap();
    }

    #[test]
    fn ack_becomes_server_error() {
        let (config, server) = fake_mpd(vec![("play", "ACK [2@0] {play} Bad song index\n")]);
        let mut client = MpdClient::connect(&config).unwrap();
        match client.control(Action::Play) {
            Err(MpdError::Server(e)) => {
                assert_eq!(e.command, "play");
                assert_eq!(e.detail, "Bad song index");
            }
            other => panic!("expected server error, got {other:?}"),
        }
        drop(client);
        server.join().unwrap();
    }

    #[test]
    fn control_actions_map_to_commands() {
        let (config, server) = fake_mpd(vec![
            ("next", "OK\n"),
            ("previous", "OK\n"),
            ("pause \"1\"", "OK\n"),
            ("pause", "OK\n"),
            ("stop", "OK\n"),
        ]);
        let mut client = MpdClient::connect(&config).unwrap();
        client.control(Action::Next).unwrap();
        client.control(Action::Prev).unwrap();
        client.control(Action::Pause).unwrap();
        client.control(Action::Toggle).unwrap();
        client.control(Action::Stop).unwrap();
        drop(client);
        assert_eq!(
            server.join().unwrap(),
            vec!["next", "previous", "pause \"1\"", "pause", "stop"]
        );
    }

    #[test]
    fn sends_quoted_password_after_greeting() {
        let (mut config, server) = fake_mpd(vec![("password", "OK\n"), ("status", "state: stop\nOK\n")]);
        config.password = Some(r#"se"cret"#.into());
        let mut client = MpdClient::connect(&config).unwrap();
        assert_eq!(client.status().unwrap(), PlaybackStatus::Stopped);
        drop(client);
        assert_eq!(server.join().unwrap(), vec![r#"password "se\"cret""#, "status"]);
    }

    #[test]
    fn wrong_password_fails_connect() {
        let (mut config, server) = fake_mpd(vec![("password", "ACK [3@0] {password} incorrect password\n")]);
        config.password = Some("nope".into());
        match MpdClient::connect(&config) {
            Err(MpdError::Server(e)) => assert!(matches!(e.code, mpd::error::ErrorCode::Password), "{e}"),
            Err(e) => panic!("expected server error, got {e}"),
            Ok(_) => panic!("expected failure"),
        }
        server.join().unwrap();
    }

    #[test]
    fn dropped_connection_is_transport_error() {
        let (config, server) = fake_mpd(vec![]);
        let mut client = MpdClient::connect(&config).unwrap();
        server.join().unwrap();
        // A closed socket must not read as an empty (stopped) status.
        let err = client.status().unwrap_err();
        assert!(err.is_transport(), "got {err}");
        let err = client.current_song().unwrap_err();
        assert!(err.is_transport(), "got {err}");
    }

    #[test]
    fn refused_connection_is_transport_error() {
        // Bind then drop to get a port that is (almost certainly) closed.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let config = MpdConfig {
            host: "127.0.0.1".into(),
            port,
            password: None,
            timeout_ms: 500,
        };
        match MpdClient::connect(&config) {
            Err(e) => assert!(e.is_transport(), "got {e}"),
            Ok(_) => panic!("expected connection failure"),
        }
    }

    #[test]
    fn unrecognised_state_is_protocol_error() {
        let (config, server) = fake_mpd(vec![("status", "state: seeking\nOK\n")]);
        let mut client = MpdClient::connect(&config).unwrap();
        let err = client.status().unwrap_err();
        assert!(matches!(err, MpdError::Protocol(_)), "got {err}");
        assert!(!err.is_transport());
        drop(client);
        server.join().unwrap();
    }

    #[test]
    fn non_mpd_greeting_is_protocol_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            s.write_all(b"SSH-2.0-OpenSSH_9.6\r\n").unwrap();
        });
        let config = MpdConfig {
            host: "127.0.0.1".into(),
            port,
            password: None,
            timeout_ms: 2000,
        };
        match MpdClient::connect(&config) {
            Err(e) => assert!(matches!(e, MpdError::Protocol(_)), "got {e}"),
            Ok(_) => panic!("expected failure"),
        }
        server.join().unwrap();
    }
}
