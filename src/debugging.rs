/// Runs a raw GL call and logs any error it left behind.
#[macro_export]
macro_rules! gl_call {
    ($fun:expr) => {{
        let result = unsafe { $fun };
        $crate::debugging::check_gl_error(file!(), line!(), stringify!($fun));
        result
    }};
}

pub fn gl_error_name(code: gl::types::GLenum) -> &'static str {
    match code {
        gl::INVALID_ENUM => "GL_INVALID_ENUM",
        gl::INVALID_VALUE => "GL_INVALID_VALUE",
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        _ => "unknown GL error",
    }
}

pub fn check_gl_error(file: &str, line: u32, call: &str) {
    loop {
        let code = unsafe { gl::GetError() };
        if code == gl::NO_ERROR {
            break;
        }
        error!(target: "gl", "{} (0x{:x}) at {}:{}: {}", gl_error_name(code), code, file, line, call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names() {
        assert_eq!(gl_error_name(gl::INVALID_ENUM), "GL_INVALID_ENUM");
        assert_eq!(gl_error_name(gl::OUT_OF_MEMORY), "GL_OUT_OF_MEMORY");
        assert_eq!(gl_error_name(0xdead), "unknown GL error");
    }
}
