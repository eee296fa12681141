pub trait Writer: std::io::Write + WriteU8 + WriteU32 {}

impl<T: std::io::Write> Writer for T {}

pub trait WriteU8: std::io::Write {
    fn write_u8(&mut self, val: u8) -> std::io::Result<()>;
}

impl<T: std::io::Write> WriteU8 for T {
    #[inline]
    fn write_u8(&mut self, val: u8) -> std::io::Result<()> {
        self.write_all(&[val])
    }
}

pub trait WriteU32: std::io::Write {
    fn write_u32(&mut self, val: u32) -> std::io::Result<()>;
}

impl<T: std::io::Write> WriteU32 for T {
    #[inline]
    fn write_u32(&mut self, val: u32) -> std::io::Result<()> {
        self.write_all(&val.to_le_bytes())
    }
}
