use crate::vlq::{self, CONTINUE};
use log::trace;
use snafu::{ResultExt, Snafu};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A sequential reader over a seekable byte stream. Every successful read and
/// skip advances a byte cursor that the track parser compares against a
/// chunk's declared byte length. One byte of rewind is supported because
/// running-status resolution needs to re-read a data byte.
pub(crate) struct ByteIter<R> {
    inner: R,
    position: u64,
}

#[derive(Debug, Snafu)]
pub(crate) enum ByteError {
    #[snafu(display("io error around byte {}: {}", position, source))]
    Io {
        position: u64,
        source: std::io::Error,
    },

    #[snafu(display("unexpected end of file around byte {}", position))]
    ShortRead { position: u64 },

    #[snafu(display("seek failed around byte {}: {}", position, source))]
    Seek {
        position: u64,
        source: std::io::Error,
    },

    #[snafu(display("unable to open '{}': {}", path.display(), source))]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub(crate) type ByteResult<T> = std::result::Result<T, ByteError>;

const BYTE_SIZE: usize = 8;
const KB: usize = BYTE_SIZE * 1024;
const MB: usize = KB * 1024;

impl ByteIter<BufReader<File>> {
    pub(crate) fn new_file<P: AsRef<Path>>(path: P) -> ByteResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).context(FileOpenSnafu { path })?;
        Ok(Self::new(BufReader::with_capacity(MB, f)))
    }
}

impl<R: Read + Seek> ByteIter<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// The number of bytes consumed so far.
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn read_exact(&mut self, buf: &mut [u8]) -> ByteResult<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.position += buf.len() as u64;
                Ok(())
            }
            Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => ShortReadSnafu {
                position: self.position,
            }
            .fail(),
            Err(e) => Err(e).context(IoSnafu {
                position: self.position,
            }),
        }
    }

    pub(crate) fn read_u8(&mut self) -> ByteResult<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub(crate) fn read2(&mut self) -> ByteResult<[u8; 2]> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn read4(&mut self) -> ByteResult<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn read_u16(&mut self) -> ByteResult<u16> {
        Ok(u16::from_be_bytes(self.read2()?))
    }

    pub(crate) fn read_u32(&mut self) -> ByteResult<u32> {
        Ok(u32::from_be_bytes(self.read4()?))
    }

    /// Skip `count` bytes without reading them.
    pub(crate) fn skip(&mut self, count: u64) -> ByteResult<()> {
        if count == 0 {
            return Ok(());
        }
        self.inner
            .seek(SeekFrom::Current(count as i64))
            .context(SeekSnafu {
                position: self.position,
            })?;
        self.position += count;
        Ok(())
    }

    /// Step back one byte so it can be read again.
    pub(crate) fn rewind1(&mut self) -> ByteResult<()> {
        self.inner.seek(SeekFrom::Current(-1)).context(SeekSnafu {
            position: self.position,
        })?;
        self.position -= 1;
        Ok(())
    }

    /// Read the bytes of one variable-length quantity: up to four bytes, the
    /// last being the first byte seen with its continuation bit clear.
    pub(crate) fn read_vlq_bytes(&mut self) -> ByteResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(4);
        for _ in 0..4 {
            let byte = self.read_u8()?;
            bytes.push(byte);
            if byte & CONTINUE == 0 {
                break;
            }
        }
        Ok(bytes)
    }

    pub(crate) fn read_vlq_u32(&mut self) -> ByteResult<u32> {
        let bytes = self.read_vlq_bytes()?;
        let decoded = vlq::decode_slice(&bytes);
        trace!("decoded vlq value {} from {} bytes", decoded, bytes.len());
        Ok(decoded)
    }
}
