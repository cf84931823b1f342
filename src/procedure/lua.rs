//! Renders a [`Procedure`] to the Lua body sent with `EVAL`.
//!
//! Each stage has its own emitter and [`render`] calls them in pipeline order, so the generated
//! text always checks, captures, clears, acts and expires in that sequence.

use super::{Action, Pattern, Plan, Precondition, Procedure, Read, Step, Ttl};

/// Keys matched by a pattern are deleted in batches so `unpack` stays under Lua's stack limit.
const DELETE_BATCH: usize = 1000;

/// Plain substring search, so the glyph is not read as a Lua pattern.
const WILDCARD_TEST: &str = "if string.find(key, '*', 1, true) then";

struct Writer {
    out: String,
    depth: usize,
}

impl Writer {
    fn new() -> Writer {
        Writer {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block(&mut self, open: &str, body: impl FnOnce(&mut Writer)) {
        self.line(open);
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self.line("end");
    }

    fn branch(
        &mut self,
        condition: &str,
        then: impl FnOnce(&mut Writer),
        otherwise: impl FnOnce(&mut Writer),
    ) {
        self.line(condition);
        self.depth += 1;
        then(self);
        self.depth -= 1;
        self.line("else");
        self.depth += 1;
        otherwise(self);
        self.depth -= 1;
        self.line("end");
    }
}

pub fn render(procedure: &Procedure) -> String {
    let mut w = Writer::new();

    guard(&mut w, procedure.precondition());

    match procedure.plan() {
        Plan::PerKey(step) => per_key(&mut w, step),
        Plan::Scan(pattern) => scan(&mut w, *pattern),
    }

    w.out
}

fn guard(w: &mut Writer, precondition: Precondition) {
    let abort_when = match precondition {
        Precondition::None => return,
        Precondition::MustExist => 0,
        Precondition::MustNotExist => 1,
    };

    w.block("for _, key in ipairs(KEYS) do", |w| {
        w.block(
            &format!("if redis.call('exists', key) == {} then", abort_when),
            |w| w.line("return nil"),
        );
    });
}

fn per_key(w: &mut Writer, step: &Step) {
    if let Ttl::ExpireIn(_) = step.ttl {
        w.line("local seconds = ARGV[#ARGV]");
    }
    w.line("local values = {}");
    w.block("for i, key in ipairs(KEYS) do", |w| {
        capture_ttl(w, step);
        capture_value(w, step);
        clear(w, step);
        action(w, step);
        expiry(w, step);
        w.line(if step.capture.is_some() {
            "values[i] = prior"
        } else {
            "values[i] = result"
        });
    });
    w.line("return {KEYS, values}");
}

fn capture_ttl(w: &mut Writer, step: &Step) {
    if step.preserves_ttl() && step.ttl == Ttl::Unset {
        w.line("local pttl = redis.call('pttl', key)");
    }
}

fn capture_value(w: &mut Writer, step: &Step) {
    if let Some(read) = step.capture {
        w.line(&format!("local prior = {}", read_call(read)));
    }
}

fn clear(w: &mut Writer, step: &Step) {
    if step.clear {
        w.line("redis.call('del', key)");
    }
}

fn action(w: &mut Writer, step: &Step) {
    let call = match step.action {
        Action::Read(read) => read_call(read),
        Action::Write(write) => {
            let payload = match step.ttl {
                Ttl::ExpireIn(_) => "unpack(ARGV, 1, #ARGV - 1)",
                _ => "unpack(ARGV)",
            };
            format!("redis.call('{}', key, {})", write.command(), payload)
        }
    };
    w.line(&format!("local result = {}", call));
}

fn expiry(w: &mut Writer, step: &Step) {
    match step.ttl {
        Ttl::Persist => w.line("redis.call('persist', key)"),
        Ttl::ExpireIn(_) => w.line("redis.call('expire', key, seconds)"),
        Ttl::Unset if step.preserves_ttl() => {
            w.block("if pttl > 0 then", |w| {
                w.line("redis.call('pexpire', key, pttl)");
            });
        }
        Ttl::Unset => {}
    }
}

fn read_call(read: Read) -> String {
    let mut call = format!("redis.call('{}', key", read.command());
    for arg in read.trailing() {
        call.push_str(&format!(", {}", arg));
    }
    call.push(')');
    call
}

fn scan(w: &mut Writer, pattern: Pattern) {
    match pattern {
        Pattern::Keys => {
            w.line("local values = {}");
            w.block("for i, key in ipairs(KEYS) do", |w| {
                w.line("values[i] = redis.call('keys', key)");
            });
            w.line("return values");
        }
        Pattern::Count => {
            w.line("local count = 0");
            w.block("for _, key in ipairs(KEYS) do", |w| {
                w.branch(
                    WILDCARD_TEST,
                    |w| w.line("count = count + #redis.call('keys', key)"),
                    |w| w.line("count = count + redis.call('exists', key)"),
                );
            });
            w.line("return count");
        }
        Pattern::Delete => {
            w.line("local count = 0");
            w.block("for _, key in ipairs(KEYS) do", |w| {
                w.branch(
                    WILDCARD_TEST,
                    |w| {
                        w.line("local matched = redis.call('keys', key)");
                        w.block(
                            &format!("for first = 1, #matched, {} do", DELETE_BATCH),
                            |w| {
                                w.line(&format!(
                                    "local last = math.min(first + {}, #matched)",
                                    DELETE_BATCH - 1
                                ));
                                w.line(
                                    "count = count + redis.call('del', unpack(matched, first, last))",
                                );
                            },
                        );
                    },
                    |w| w.line("count = count + redis.call('del', key)"),
                );
            });
            w.line("return count");
        }
        Pattern::Remove => {
            w.line("local count = 0");
            w.block("for _, key in ipairs(KEYS) do", |w| {
                w.line("count = count + redis.call('del', key)");
            });
            w.line("return count");
        }
    }
}
